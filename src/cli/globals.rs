use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, state_dir: PathBuf) -> Self {
        Self { api_url, state_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://api.hospital.tld".to_string(),
            PathBuf::from("/tmp/clinigate"),
        );
        assert_eq!(args.api_url, "https://api.hospital.tld");
        assert_eq!(args.state_dir, PathBuf::from("/tmp/clinigate"));
    }
}
