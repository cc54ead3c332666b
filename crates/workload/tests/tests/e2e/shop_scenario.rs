//! End-to-end test: the shop workload compiles into a three-node plan and
//! one behavior matrix.

use workload_behavior::split_cell;
use workload_compiler::{
    CompilerConfig, ExecutionNode, JsonPlanWriter, SamplerSpec, SessionNodeId, WorkloadCompiler,
};
use workload_tests::shop_model;

#[test]
fn shop_plan_structure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let compiler = WorkloadCompiler::new(CompilerConfig::default().with_output_dir(dir.path()));

    let artifact = compiler.compile(&shop_model())?;
    let plan = &artifact.plan;

    let names: Vec<&str> = plan.session_nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Login", "Browse", "Checkout"]);
    assert_eq!(plan.initial_node().map(|n| n.name.as_str()), Some("Login"));
    assert!(plan.warnings.is_empty());

    let login = &plan.session_nodes[0];
    assert_eq!(login.transitions.len(), 3);
    let to_login = login.transition_to(SessionNodeId(0)).expect("Login -> Login entry");
    let to_browse = login.transition_to(SessionNodeId(1)).expect("Login -> Browse entry");
    let to_checkout = login.transition_to(SessionNodeId(2)).expect("Login -> Checkout entry");
    assert!(!to_login.enabled);
    assert!(to_browse.enabled);
    assert!(!to_checkout.enabled);
    assert_eq!(to_browse.guard, "");
    assert_eq!(to_browse.action, "");

    let checkout = &plan.session_nodes[2];
    assert_eq!(checkout.enabled_transitions().count(), 0);

    // One request per state, hung below its session node.
    let walk: Vec<(bool, &str)> = plan
        .walk()
        .iter()
        .map(|n| (n.is_session(), n.name()))
        .collect();
    assert_eq!(
        walk,
        vec![
            (true, "Login"),
            (false, "login"),
            (true, "Browse"),
            (false, "browse"),
            (true, "Checkout"),
            (false, "checkout"),
        ]
    );
    match plan.walk()[1] {
        ExecutionNode::Request(request) => {
            assert!(matches!(request.sampler, SamplerSpec::Http { ref path, .. } if path == "/login"));
        }
        other => panic!("Expected request node, got {:?}", other),
    }
    Ok(())
}

#[test]
fn shop_matrix_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let compiler = WorkloadCompiler::new(CompilerConfig::default().with_output_dir(dir.path()));

    let artifact = compiler.compile(&shop_model())?;
    assert!(artifact.is_complete());

    let entry = artifact.mix_report.entry("casual").expect("casual entry");
    assert_eq!(entry.relative_frequency, 1.0);
    assert_eq!(artifact.plan.behavior_mix, artifact.mix_report.entries);

    let content = std::fs::read_to_string(dir.path().join("casual.csv"))?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], ",Login*,Browse,Checkout,$");
    assert_eq!(
        lines[1],
        "Login*,0.0; n(0 0),0.8; n(3000 300),0.0; n(0 0),0.2; n(3000 300)"
    );

    let header: Vec<&str> = lines[0].split(',').collect();
    let login: Vec<&str> = lines[1].split(',').collect();
    let browse_col = header.iter().position(|h| *h == "Browse").expect("Browse column");
    let exit_col = header.iter().position(|h| *h == "$").expect("exit column");
    assert_eq!(split_cell(login[browse_col]).map(|(p, _)| p), Some(0.8));
    assert_eq!(split_cell(login[exit_col]).map(|(p, _)| p), Some(0.2));

    assert!(lines[3].starts_with("Checkout,"));
    assert!(lines[3].ends_with(",1.0; n(3000 300)"));
    Ok(())
}

#[test]
fn shop_plan_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let compiler = WorkloadCompiler::new(CompilerConfig::default().with_output_dir(dir.path()));
    let writer = JsonPlanWriter::new(dir.path().join("shop.plan.json"));

    let artifact = compiler.compile_into(&shop_model(), &writer)?;

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(writer.path())?)?;
    assert_eq!(json["name"], "shop");
    assert_eq!(json["session_nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["session_nodes"][0]["transitions"][1]["enabled"], true);
    assert_eq!(json["session_nodes"][0]["requests"][0]["sampler"]["sampler"], "http");
    assert_eq!(json["behavior_mix"][0]["name"], "casual");
    assert_eq!(json["id"], artifact.plan.id.0.as_str());
    Ok(())
}
