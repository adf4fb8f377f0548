//! Tests for server bootstrap and data file seeding.

use super::{ServerConfig, create_server};
use recordkeeper::outbound::persistence::{BACKUP_DIR, DATABASE_FILE};
use recordkeeper::test_support::cap_fs::list_file_names;
use recordkeeper::test_support::{temp_data_dir, test_signer};
use rstest::rstest;

#[rstest]
#[actix_rt::test]
async fn create_server_seeds_data_directory() {
    let data = temp_data_dir();
    let config = ServerConfig::new(
        "127.0.0.1:0".parse().expect("loopback address"),
        data.path().to_path_buf(),
        test_signer(),
    )
    .with_backup_retention(3);
    assert_eq!(config.bind_addr().port(), 0);

    let _server = create_server(config).await.expect("server should build");

    let names = list_file_names(data.path()).expect("list data dir");
    assert!(names.contains(&DATABASE_FILE.to_owned()));
    assert!(names.contains(&BACKUP_DIR.to_owned()));
}
