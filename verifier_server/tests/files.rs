//! Config and key files on disk

use plonk_verifier::fixtures::Fixture;
use std::io::Write;
use verifier_server::{
    check_proof, load_verification_key, save_verification_key, KeyFileError, ServerConfig,
    VerifyRequest,
};

#[test]
fn test_toml_and_binary_keys_agree() {
    let f = Fixture::recursive(81);
    let dir = tempfile::tempdir().unwrap();
    let toml_path = dir.path().join("rollup.toml");
    let bin_path = dir.path().join("rollup.bin");

    save_verification_key(&toml_path, &f.vk).unwrap();
    save_verification_key(&bin_path, &f.vk).unwrap();

    let from_toml = load_verification_key(&toml_path).unwrap();
    let from_bin = load_verification_key(&bin_path).unwrap();
    assert_eq!(from_toml, f.vk);
    assert_eq!(from_bin, f.vk);
    assert_eq!(from_toml.hash(), from_bin.hash());
}

#[test]
fn test_loaded_key_verifies_proof() {
    let f = Fixture::non_recursive(82);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vk.toml");
    save_verification_key(&path, &f.vk).unwrap();

    let vk = load_verification_key(&path).unwrap();
    let request = VerifyRequest::from_words(&f.proof.to_words());
    let response = check_proof(&vk, &hex::encode(vk.hash()), &request, "file-test").unwrap();
    assert!(response.valid);
}

#[test]
fn test_truncated_binary_key_rejected() {
    let f = Fixture::recursive(83);
    let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    file.write_all(&f.vk.to_bytes()[..1000]).unwrap();

    assert!(matches!(
        load_verification_key(file.path()),
        Err(KeyFileError::Key(_))
    ));
}

#[test]
fn test_missing_key_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_verification_key(&dir.path().join("absent.toml")),
        Err(KeyFileError::Io(_))
    ));
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bind = "0.0.0.0:9200"
key_file = "/etc/plonk/vk.toml"
log_level = "debug"
log_json = true
max_batch_size = 32
cors_origins = ["http://localhost:3000"]
"#
    )
    .unwrap();

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.bind_addr().unwrap().port(), 9200);
    assert_eq!(config.max_batch_size, 32);
    assert!(config.log_json);
    assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServerConfig::from_file(&dir.path().join("none.toml")).unwrap_err();
    assert!(err.to_string().contains("none.toml"));
}

#[test]
fn test_verification_runs_off_runtime() {
    // the core is synchronous; a blocking task returns the same verdict
    let f = Fixture::recursive(84);
    let vk = f.vk.clone();
    let request = VerifyRequest::from_words(&f.proof.to_words());

    let response = tokio_test::block_on(async move {
        tokio::task::spawn_blocking(move || {
            check_proof(&vk, &hex::encode(vk.hash()), &request, "blocking").unwrap()
        })
        .await
        .unwrap()
    });
    assert!(response.valid);
}
