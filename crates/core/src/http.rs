use url::Url;

/// Joins `path` below `base`, keeping any path prefix already on `base`
/// (`http://host/v1` + `chat/completions` -> `http://host/v1/chat/completions`).
pub(crate) fn join_endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base.trim())?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::join_endpoint;

    #[test]
    fn path_prefix_survives_join() {
        let url = join_endpoint("https://api.openai.com/v1", "chat/completions").unwrap();
        assert_eq!(url.as_str(), "https://api.openai.com/v1/chat/completions");

        let url = join_endpoint("http://localhost:6333/", "/collections/docs").unwrap();
        assert_eq!(url.as_str(), "http://localhost:6333/collections/docs");
    }
}
