//! End-to-end test: models loaded from JSON and YAML documents compile the
//! same way as models built in code.

use workload_compiler::{CompilerConfig, WorkloadCompiler};
use workload_tests::shop_model;
use workload_types::{ModelError, WorkloadModel};

const CHECKOUT_YAML: &str = r#"
name: checkout-only
session:
  services:
    - id: cart
      name: Cart
    - id: pay
      name: Pay
  states:
    - service: cart
      protocol:
        states:
          - request:
              id: view-cart
              kind:
                type: http
                method: GET
                domain: shop.local
                path: /cart
            assertions:
              - pattern: "Your cart"
            transitions:
              - target: exit
        initial: 0
      transitions:
        - source: 0
          target:
            state: 1
    - service: pay
      protocol:
        states:
          - request:
              id: pay
              kind:
                type: http
                method: POST
                domain: shop.local
                path: /pay
        initial: 0
  initial: 0
behavior_mix:
  models:
    - relative_frequency: 1.0
      model:
        name: buyer
        filename: buyer.csv
        states:
          - service: cart
            transitions:
              - probability: 0.9
                target:
                  state: 1
                think_time:
                  type: uniform
                  min: 100.0
                  max: 200.0
              - probability: 0.1
                target: exit
                think_time:
                  type: uniform
                  min: 100.0
                  max: 200.0
          - service: pay
            transitions:
              - probability: 1.0
                target: exit
                think_time:
                  type: uniform
                  min: 0.0
                  max: 50.0
        initial: 0
"#;

#[test]
fn json_document_compiles_like_code() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shop.json");
    std::fs::write(&path, shop_model().to_json_string()?)?;

    let loaded = WorkloadModel::load(&path)?;
    let compiler = WorkloadCompiler::new(CompilerConfig::default().with_output_dir(dir.path()));

    let from_doc = compiler.compile(&loaded)?;
    let from_code = compiler.compile(&shop_model())?;

    let names = |nodes: &[workload_compiler::SessionNode]| -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    };
    assert_eq!(names(&from_doc.plan.session_nodes), names(&from_code.plan.session_nodes));
    for (a, b) in from_doc
        .plan
        .session_nodes
        .iter()
        .zip(&from_code.plan.session_nodes)
    {
        assert_eq!(a.transitions, b.transitions);
        assert_eq!(a.requests, b.requests);
    }
    assert_eq!(from_doc.plan.behavior_mix, from_code.plan.behavior_mix);
    Ok(())
}

#[test]
fn yaml_document_compiles() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("checkout.yaml");
    std::fs::write(&path, CHECKOUT_YAML)?;

    let model = WorkloadModel::load(&path)?;
    let compiler = WorkloadCompiler::new(CompilerConfig::default().with_output_dir(dir.path()));
    let artifact = compiler.compile(&model)?;

    let names: Vec<&str> = artifact
        .plan
        .session_nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["Cart", "Pay"]);

    let cart = &artifact.plan.session_nodes[0];
    let assertion = cart.requests[0].assertion.as_ref().expect("cart assertion");
    assert_eq!(assertion.patterns, vec!["Your cart"]);

    let matrix = std::fs::read_to_string(dir.path().join("buyer.csv"))?;
    let lines: Vec<&str> = matrix.lines().collect();
    assert_eq!(lines[0], ",Cart*,Pay,$");
    assert_eq!(lines[1], "Cart*,0.0; u(0 0),0.9; u(100 200),0.1; u(100 200)");
    assert_eq!(lines[2], "Pay,0.0; u(0 0),0.0; u(0 0),1.0; u(0 50)");
    Ok(())
}

#[test]
fn unsupported_document_format() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shop.xml");
    std::fs::write(&path, "<model/>")?;

    let result = WorkloadModel::load(&path);
    assert!(matches!(result, Err(ModelError::UnsupportedFormat(ref ext)) if ext == "xml"));
    Ok(())
}
