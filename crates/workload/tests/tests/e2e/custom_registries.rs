//! End-to-end test: caller-supplied transformers and formatters are used
//! by the compiler instead of failing on unknown types.

use std::collections::BTreeMap;
use workload_behavior::{ThinkTimeFormatter, ThinkTimeFormatters};
use workload_compiler::{
    CompilerConfig, CompilerError, CompilerResult, GuardNegation, RequestTransformer,
    RequestTransformers, SamplerSpec, WorkloadCompiler,
};
use workload_tests::{casual_behavior, session_graph};
use workload_types::{
    Action, BehaviorMix, Guard, Parameter, ProtocolGraph, Request, RequestKind, RequestKindTag,
    SessionTransition, ThinkTime, ThinkTimeKind, WorkloadModel,
};

struct GrpcTransformer;

impl RequestTransformer for GrpcTransformer {
    fn kind(&self) -> RequestKindTag {
        RequestKindTag::Extension("grpc".into())
    }

    fn transform(&self, request: &Request) -> CompilerResult<SamplerSpec> {
        match &request.kind {
            RequestKind::Extension {
                type_name,
                properties,
            } => Ok(SamplerSpec::Custom {
                type_name: type_name.clone(),
                properties: properties.clone(),
            }),
            _ => Err(CompilerError::InvalidRequest {
                request: request.id.clone(),
                reason: "expected a gRPC call".into(),
            }),
        }
    }
}

struct ParetoFormatter;

impl ThinkTimeFormatter for ParetoFormatter {
    fn kind(&self) -> ThinkTimeKind {
        ThinkTimeKind::Extension("pareto".into())
    }

    fn format(&self, think_time: &ThinkTime) -> Option<String> {
        match think_time {
            ThinkTime::Extension { type_name } if type_name == "pareto" => {
                Some("p(1.5)".to_string())
            }
            _ => None,
        }
    }

    fn default_think_time(&self) -> String {
        "p(0)".to_string()
    }
}

fn grpc_shop() -> WorkloadModel {
    let (mut session, states) = session_graph(&["Login", "Browse", "Checkout"]);

    let mut properties = BTreeMap::new();
    properties.insert("method".to_string(), "PlaceOrder".to_string());
    session.states[states[2].index()].protocol = ProtocolGraph::single(Request::new(
        "place-order",
        RequestKind::Extension {
            type_name: "grpc".into(),
            properties,
        },
    ));

    let cart_items = Parameter::integer("cartItems")
        .with_target("Browse")
        .with_source("Checkout");
    session
        .add_transition(
            SessionTransition::new(states[0], states[1])
                .with_guard(Guard::new(Parameter::boolean("loggedIn")))
                .with_action(Action::new(Parameter::boolean("browsed")))
                .with_action(Action::new(cart_items.clone())),
        )
        .expect("Login -> Browse");
    session
        .add_transition(
            SessionTransition::new(states[1], states[2])
                .with_guard(Guard::new(cart_items.clone())),
        )
        .expect("Browse -> Checkout");
    session
        .add_transition(
            SessionTransition::new(states[2], states[1]).with_action(Action::new(cart_items)),
        )
        .expect("Checkout -> Browse");

    let pareto = ThinkTime::Extension {
        type_name: "pareto".into(),
    };
    WorkloadModel::new("grpc-shop", session)
        .with_behavior_mix(BehaviorMix::new().with_model(1.0, casual_behavior(pareto)))
}

#[test]
fn custom_registries_are_used() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let compiler = WorkloadCompiler::with_registries(
        CompilerConfig::default().with_output_dir(dir.path()),
        RequestTransformers::with_defaults().with(Box::new(GrpcTransformer)),
        ThinkTimeFormatters::with_defaults().with(Box::new(ParetoFormatter)),
    );

    let artifact = compiler.compile(&grpc_shop())?;
    assert!(artifact.is_complete());

    let checkout = artifact
        .plan
        .node_by_name("Checkout")
        .expect("Checkout node");
    match &checkout.requests[0].sampler {
        SamplerSpec::Custom {
            type_name,
            properties,
        } => {
            assert_eq!(type_name, "grpc");
            assert_eq!(properties.get("method").map(String::as_str), Some("PlaceOrder"));
        }
        other => panic!("Expected custom sampler, got {:?}", other),
    }

    let content = std::fs::read_to_string(dir.path().join("casual.csv"))?;
    let login_row = content.lines().nth(1).unwrap_or_default();
    assert_eq!(login_row, "Login*,0.0; p(0),0.8; p(1.5),0.0; p(0),0.2; p(1.5)");
    Ok(())
}

#[test]
fn guards_and_actions_in_plan() -> anyhow::Result<()> {
    let compiler = WorkloadCompiler::with_registries(
        CompilerConfig::default(),
        RequestTransformers::with_defaults().with(Box::new(GrpcTransformer)),
        ThinkTimeFormatters::with_defaults(),
    );
    let plan = compiler.lower(&grpc_shop())?;

    let login = &plan.session_nodes[0];
    let browse = &plan.session_nodes[1];
    let checkout = &plan.session_nodes[2];

    let entry = login.transition_to(browse.id).expect("Login -> Browse");
    assert_eq!(entry.guard, "!loggedIn");
    assert_eq!(entry.action, "browsed=true; cartItems=cartItems+1");

    let entry = browse.transition_to(checkout.id).expect("Browse -> Checkout");
    assert_eq!(entry.guard, "cartItems > 0");
    assert_eq!(entry.action, "");

    // Entering the target service wins over leaving the source service.
    let entry = checkout.transition_to(browse.id).expect("Checkout -> Browse");
    assert_eq!(entry.action, "cartItems=cartItems+1");
    Ok(())
}

#[test]
fn guard_negation_from_config() -> anyhow::Result<()> {
    let config = CompilerConfig::from_toml_str("[plan]\nguard_negation = \"prefix_negated\"\n")?;
    assert_eq!(config.plan.guard_negation, GuardNegation::PrefixNegated);

    let compiler = WorkloadCompiler::with_registries(
        config,
        RequestTransformers::with_defaults().with(Box::new(GrpcTransformer)),
        ThinkTimeFormatters::with_defaults(),
    );
    let plan = compiler.lower(&grpc_shop())?;
    let login = &plan.session_nodes[0];
    assert_eq!(login.transitions[1].guard, "loggedIn");
    Ok(())
}
