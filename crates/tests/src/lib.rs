//! # Integration Tests
//!
//! Cross-crate scenarios for the commit stage:
//! - config file -> dispatcher tree -> filesystem artifacts
//! - partial-failure visibility across destinations
//! - content replay across spooled and in-memory backings

#[cfg(test)]
mod contract_tests {
    use contracts::{HandlerConfig, HandlerType};

    #[test]
    fn test_contracts_compile() {
        let _ = HandlerConfig::new("console", HandlerType::Log);
    }
}

#[cfg(test)]
mod observability_tests {
    use observability::{init_with_config, LogFormat, ObservabilityConfig};

    #[test]
    fn test_second_subscriber_install_fails_cleanly() {
        let config = ObservabilityConfig {
            log_format: LogFormat::Compact,
            default_log_level: "warn".to_string(),
        };
        init_with_config(config.clone()).unwrap();
        assert!(init_with_config(config).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::io::Read;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        CommitOperation, CommitterError, CommitterHandler, HandlerContext, Metadata, SpoolConfig,
    };
    use dispatcher::handlers::list_operation_files;
    use dispatcher::{create_dispatcher, FanOutDispatcher, LogHandler};
    use tempfile::tempdir;

    /// Handler that always fails on handle, for partial-failure scenarios
    struct FailingHandler {
        name: String,
    }

    impl CommitterHandler for FailingHandler {
        fn name(&self) -> &str {
            &self.name
        }
        fn init(&mut self, _ctx: &HandlerContext) -> Result<(), CommitterError> {
            Ok(())
        }
        fn handle(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError> {
            Err(CommitterError::handle(
                &self.name,
                op.reference(),
                "destination unavailable",
            ))
        }
        fn commit(&mut self) -> Result<(), CommitterError> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), CommitterError> {
            Ok(())
        }
        fn clean(&mut self) -> Result<(), CommitterError> {
            Ok(())
        }
    }

    /// End-to-end: config file -> dispatcher -> filesystem
    ///
    /// 1. Load a TOML pipeline config with a log handler and a file handler
    /// 2. Dispatch an upsert and a delete through the tree
    /// 3. Verify the file destination holds both operations
    #[test]
    fn test_e2e_config_to_filesystem() {
        let dir = tempdir().unwrap();
        let config_toml = format!(
            r#"
[spool]
max_memory_bytes = 1024

[[handlers]]
name = "console"
handler_type = "log"

[[handlers]]
name = "archive"
handler_type = "file"
directory = "{}"
"#,
            dir.path().display()
        );

        let config = ConfigLoader::load_from_str(&config_toml, ConfigFormat::Toml).unwrap();
        let mut dispatcher = create_dispatcher(&config).unwrap();
        dispatcher
            .init(&HandlerContext::new("pipeline", config.spool.clone()))
            .unwrap();

        let mut upsert = CommitOperation::upsert(
            "http://example.com/doc1",
            Metadata::single("title", "Hello"),
            "hello body",
        );
        dispatcher.handle(&mut upsert).unwrap();

        let mut delete = CommitOperation::delete("http://example.com/doc2", Metadata::new());
        dispatcher.handle(&mut delete).unwrap();

        dispatcher.commit().unwrap();
        dispatcher.close().unwrap();

        let upserts = list_operation_files(dir.path(), "upserts").unwrap();
        assert_eq!(upserts.len(), 2); // content + metadata
        let deletes = list_operation_files(dir.path(), "deletes").unwrap();
        assert_eq!(deletes.len(), 1);

        let snapshots = dispatcher.metrics();
        for (_, snapshot) in snapshots {
            assert_eq!(snapshot.upsert_count, 1);
            assert_eq!(snapshot.delete_count, 1);
            assert_eq!(snapshot.failure_count, 0);
        }
    }

    /// Two log-style children: both record exactly one upsert for "doc1"
    #[test]
    fn test_e2e_two_log_children_happy_path() {
        let mut dispatcher = FanOutDispatcher::new("root");
        dispatcher.add_handler(Box::new(LogHandler::new("console_a")));
        dispatcher.add_handler(Box::new(LogHandler::new("console_b")));

        dispatcher
            .init(&HandlerContext::new("pipeline", SpoolConfig::default()))
            .unwrap();

        let mut op = CommitOperation::upsert(
            "doc1",
            Metadata::single("title", "Hello"),
            "hello body",
        );
        dispatcher.handle(&mut op).unwrap();
        dispatcher.commit().unwrap();
        dispatcher.close().unwrap();

        for (name, snapshot) in dispatcher.metrics() {
            assert!(name.starts_with("console_"));
            assert_eq!(snapshot.upsert_count, 1);
            assert_eq!(snapshot.delete_count, 0);
        }
    }

    /// Second child fails: the error surfaces, and the first child's
    /// record on disk is not rolled back.
    #[test]
    fn test_e2e_partial_failure_is_visible_not_rolled_back() {
        let dir = tempdir().unwrap();
        let mut dispatcher = FanOutDispatcher::new("root");
        dispatcher.add_handler(Box::new(
            dispatcher::FileSystemHandler::new(
                "archive",
                dispatcher::FileSystemHandlerConfig {
                    directory: dir.path().to_path_buf(),
                },
            ),
        ));
        dispatcher.add_handler(Box::new(FailingHandler {
            name: "broken".to_string(),
        }));

        dispatcher
            .init(&HandlerContext::new("pipeline", SpoolConfig::default()))
            .unwrap();

        let mut op = CommitOperation::upsert("doc1", Metadata::new(), "survives");
        let err = dispatcher.handle(&mut op).unwrap_err();
        match err {
            CommitterError::Handle { handler, .. } => assert_eq!(handler, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }

        // First destination keeps its record.
        let upserts = list_operation_files(dir.path(), "upserts").unwrap();
        let content_file = upserts
            .iter()
            .find(|p| p.to_string_lossy().ends_with("cntnt"))
            .unwrap();
        assert_eq!(fs::read_to_string(content_file).unwrap(), "survives");
    }

    /// Spooled content fans out intact to multiple file destinations
    #[test]
    fn test_e2e_spooled_content_fans_out_to_all_destinations() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let spool = SpoolConfig {
            max_memory_bytes: 64,
            spool_dir: None,
        };

        let ctx = HandlerContext::new("pipeline", spool);
        let payload: Vec<u8> = (b'a'..=b'z').cycle().take(8192).collect();
        let content = ctx.ensure_replayable(&payload[..]).unwrap();
        assert!(content.is_spooled());

        let mut dispatcher = FanOutDispatcher::new("root");
        for (name, dir) in [("fs_a", dir_a.path()), ("fs_b", dir_b.path())] {
            dispatcher.add_handler(Box::new(dispatcher::FileSystemHandler::new(
                name,
                dispatcher::FileSystemHandlerConfig {
                    directory: dir.to_path_buf(),
                },
            )));
        }
        dispatcher.init(&ctx).unwrap();

        let mut op = CommitOperation::upsert("big-doc", Metadata::new(), content);
        dispatcher.handle(&mut op).unwrap();
        dispatcher.close().unwrap();

        for dir in [dir_a.path(), dir_b.path()] {
            let files = list_operation_files(dir, "upserts").unwrap();
            let content_file = files
                .iter()
                .find(|p| p.to_string_lossy().ends_with("cntnt"))
                .unwrap();
            assert_eq!(fs::read(content_file).unwrap(), payload);
        }

        // Content is still replayable after full dispatch.
        let replay = op.content_mut().unwrap();
        replay.rewind().unwrap();
        let mut buf = Vec::new();
        replay.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, payload);
    }

    /// A dispatcher nested inside another, built entirely from config
    #[test]
    fn test_e2e_nested_tree_from_config() {
        let dir = tempdir().unwrap();
        let config_toml = format!(
            r#"
[[handlers]]
name = "console"
handler_type = "log"
ignore_content = true

[[handlers]]
name = "tree"
handler_type = "fan_out"

[[handlers.children]]
name = "archive"
handler_type = "file"
directory = "{}"
"#,
            dir.path().display()
        );

        let config = ConfigLoader::load_from_str(&config_toml, ConfigFormat::Toml).unwrap();
        let mut dispatcher = create_dispatcher(&config).unwrap();
        dispatcher
            .init(&HandlerContext::new("pipeline", config.spool.clone()))
            .unwrap();

        let mut op = CommitOperation::upsert("doc1", Metadata::new(), "nested body");
        dispatcher.handle(&mut op).unwrap();
        dispatcher.close().unwrap();

        // The leaf below the nested dispatcher received the full content.
        let files = list_operation_files(dir.path(), "upserts").unwrap();
        let content_file = files
            .iter()
            .find(|p| p.to_string_lossy().ends_with("cntnt"))
            .unwrap();
        assert_eq!(fs::read_to_string(content_file).unwrap(), "nested body");
    }
}
