use std::fs;

use getwatch::generate_client;
use getwatch::generate_server;
use getwatch::CodegenConfig;
use getwatch::CodegenError;
use getwatch::Error;
use getwatch::ResourceDescriptor;

use crate::commons::target_file;
use crate::commons::CLIENT_PRELUDE;
use crate::commons::SERVER_PRELUDE;
use crate::enable_logger;

#[test]
fn test_client_file_grows_one_region_per_resource() {
    enable_logger();
    let (_dir, path) = target_file(CLIENT_PRELUDE);
    let config = CodegenConfig::default();

    for (name, key) in [("Pod", Some("id")), ("PodGroup", Some("appName")), ("Nodes", None)] {
        generate_client(&path, &ResourceDescriptor::new(name, key).unwrap(), &config).unwrap();
    }
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.starts_with(CLIENT_PRELUDE));
    for name in ["Pod", "PodGroup", "Nodes"] {
        assert_eq!(text.matches(&format!("// CODE GENERATION {name} START")).count(), 1);
        assert_eq!(text.matches(&format!("// CODE GENERATION {name} END")).count(), 1);
        assert!(text.contains(&format!("pub type {name}Watcher = getwatch::Watcher<pb::{name}Reply>;")));
    }
    assert!(text.contains("pub async fn nodes_get(&self) -> Result<pb::NodesReply, tonic::Status>"));
    assert!(text.contains("let request = pb::PodGroupRequest { app_name };"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);
    let config = CodegenConfig::default();
    let pod = ResourceDescriptor::new("Pod", Some("id")).unwrap();
    let nodes = ResourceDescriptor::new("Nodes", None).unwrap();

    generate_client(&path, &pod, &config).unwrap();
    generate_client(&path, &nodes, &config).unwrap();
    let first = fs::read(&path).unwrap();

    generate_client(&path, &pod, &config).unwrap();
    generate_client(&path, &nodes, &config).unwrap();

    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn test_hand_written_code_between_regions_survives() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);
    let config = CodegenConfig::default();
    let pod = ResourceDescriptor::new("Pod", None).unwrap();

    generate_client(&path, &pod, &config).unwrap();
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("\n\nfn helper() {}\n");
    fs::write(&path, &text).unwrap();

    generate_client(&path, &ResourceDescriptor::new("Pod", Some("id")).unwrap(), &config).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(CLIENT_PRELUDE));
    assert!(text.ends_with("\n\nfn helper() {}\n"));
    assert!(text.contains("pub async fn pod_get(&self, id: String)"));
}

#[test]
fn test_server_regions_are_keyed_by_index() {
    let (_dir, path) = target_file(SERVER_PRELUDE);
    let config = CodegenConfig {
        proto_module: "crate::pb".to_string(),
        ..Default::default()
    };

    generate_server(&path, 1, &ResourceDescriptor::new("Config", None).unwrap(), &config).unwrap();
    generate_server(&path, 2, &ResourceDescriptor::new("Pod", None).unwrap(), &config).unwrap();
    generate_server(&path, 12, &ResourceDescriptor::new("Nodes", None).unwrap(), &config).unwrap();
    generate_server(&path, 1, &ResourceDescriptor::new("Config", None).unwrap(), &config).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("// CODE GENERATION 1 START").count(), 1);
    assert!(text.contains("impl crate::pb::config_server::Config for ConfigEndpoint"));
    assert!(text.contains("impl crate::pb::pod_server::Pod for PodEndpoint"));
    assert!(text.contains("impl crate::pb::nodes_server::Nodes for NodesEndpoint"));
}

#[test]
fn test_duplicate_region_aborts_without_writing() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);
    let config = CodegenConfig::default();
    let pod = ResourceDescriptor::new("Pod", None).unwrap();
    generate_client(&path, &pod, &config).unwrap();
    let once = fs::read_to_string(&path).unwrap();
    let twice = format!("{once}\n{}", once.trim_start_matches(CLIENT_PRELUDE));
    fs::write(&path, &twice).unwrap();

    let e = generate_client(&path, &pod, &config).unwrap_err();

    assert!(matches!(
        e,
        Error::Codegen(CodegenError::MalformedRegion { starts: 2, ends: 2, .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), twice);
}
