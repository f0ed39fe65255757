#[cfg(test)]
mod tests {
    use crate::config::Config;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.vision.invoke_url, "https://ai.api.nvidia.com/v1/vlm");
        assert_eq!(config.vision.model, "nvidia/neva-22b");
        assert_eq!(config.vision.content, "Describe the image. ");
        assert_eq!(config.vision.max_tokens, 512);
        assert_eq!(config.vision.temperature, 1.0);
        assert_eq!(config.vision.top_p, 0.7);
        assert_eq!(config.vision.timeout_secs, 60);
        assert!(!config.vision.stream);
        assert!(config.vision.api_key.is_empty());
        assert_eq!(config.logging.level, "info");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_model() {
        let mut config = Config::default();
        config.vision.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_tokens() {
        let mut config = Config::default();
        config.vision.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_top_p() {
        let mut config = Config::default();
        config.vision.top_p = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_section_keeps_remaining_defaults() {
        let config: Config = toml::from_str("[vision]\nstream = true\nmax_tokens = 128\n").unwrap();
        assert!(config.vision.stream);
        assert_eq!(config.vision.max_tokens, 128);
        assert_eq!(config.vision.model, "nvidia/neva-22b");
    }

    #[test]
    fn load_from_expands_api_key_env() {
        std::env::set_var("AGENT_VISION_TEST_KEY", "sk-test");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision]\napi_key = \"${AGENT_VISION_TEST_KEY}\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.vision.api_key, "sk-test");
    }

    #[test]
    fn unset_env_var_is_left_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[vision]\napi_key = \"${AGENT_VISION_DEFINITELY_UNSET}\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.vision.api_key, "${AGENT_VISION_DEFINITELY_UNSET}");
    }
}
