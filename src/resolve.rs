//! Resource resolution.
//!
//! Maps a `src`/`href` value to the bytes it refers to. Local build output
//! always wins: the base-stripped path is looked up in the bundle first, and
//! only references that miss the bundle and are absolute `http(s)` URLs go to
//! the network.

use crate::bundle::Bundle;
use crate::config::PluginConfig;
use crate::fetch::{Fetch, FetchError};

/// Outcome of resolving one reference.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Found in the bundle under the given key.
    Bundle { key: &'a str, content: &'a [u8] },
    /// Fetched from a remote URL.
    Remote(Vec<u8>),
    /// Neither a bundle entry nor an absolute URL.
    NotFound,
}

impl Resolution<'_> {
    /// Resolved bytes, if any.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Self::Bundle { content, .. } => Some(*content),
            Self::Remote(body) => Some(body.as_slice()),
            Self::NotFound => None,
        }
    }
}

/// Strip `base` from the front of `path` when it is a literal prefix.
///
/// No URL normalization happens here: `/local` does not strip from
/// `/local/main.js` as `local/main.js` unless `base` is exactly `/local`.
#[inline]
pub fn strip_base<'p>(path: &'p str, base: &str) -> &'p str {
    path.strip_prefix(base).unwrap_or(path)
}

/// Whether `path` is an absolute `http(s)` URL.
#[inline]
pub fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Resolves references against one build's bundle.
pub struct Resolver<'a, F> {
    config: &'a PluginConfig,
    bundle: &'a Bundle,
    fetcher: &'a F,
}

impl<'a, F: Fetch> Resolver<'a, F> {
    pub fn new(config: &'a PluginConfig, bundle: &'a Bundle, fetcher: &'a F) -> Self {
        Self {
            config,
            bundle,
            fetcher,
        }
    }

    /// Resolve `path` to its content.
    ///
    /// Fetch failures are returned as errors; a reference that is neither
    /// local nor remote is [`Resolution::NotFound`].
    pub async fn resolve(&self, path: &str) -> Result<Resolution<'a>, FetchError> {
        let key = strip_base(path, &self.config.base);

        if let Some((key, artifact)) = self.bundle.get_key_value(key) {
            return Ok(Resolution::Bundle {
                key,
                content: artifact.content(),
            });
        }

        if is_remote(path) {
            let body = self.fetcher.fetch(path).await?;
            return Ok(Resolution::Remote(body));
        }

        Ok(Resolution::NotFound)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bundle::Artifact;
    use std::sync::Mutex;

    /// Scripted fetcher: fixed responses per URL, records every request.
    #[derive(Default)]
    pub(crate) struct StubFetcher {
        responses: Vec<(String, Result<Vec<u8>, u16>)>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(mut self, url: &str, body: &str) -> Self {
            self.responses
                .push((url.to_string(), Ok(body.as_bytes().to_vec())));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.responses.push((url.to_string(), Err(status)));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            let response = self
                .responses
                .iter()
                .find(|(candidate, _)| candidate == url)
                .map(|(_, response)| response.clone())
                .unwrap_or(Err(404));
            response.map_err(|status| FetchError::Status {
                url: url.to_string(),
                status,
            })
        }
    }

    fn bundle() -> Bundle {
        [
            ("main.js", Artifact::chunk("console.log(1)")),
            ("assets/style.css", Artifact::asset("body{}")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("/main.js", "/"), "main.js");
        assert_eq!(strip_base("/local/main.js", "/local/"), "main.js");
        assert_eq!(strip_base("main.js", ""), "main.js");
        assert_eq!(strip_base("/local/main.js", "/other/"), "/local/main.js");
        assert_eq!(strip_base("https://example.com/main.js", "https://example.com/"), "main.js");
        // Literal prefix only, no trailing-slash canonicalization
        assert_eq!(strip_base("/local/main.js", "/local"), "/main.js");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("http://example.com/a.js"));
        assert!(is_remote("https://example.com/a.js"));
        assert!(!is_remote("//example.com/a.js"));
        assert!(!is_remote("/https://a.js"));
        assert!(!is_remote("../lib/a.js"));
    }

    #[tokio::test]
    async fn test_resolve_local() {
        let bundle = bundle();
        let config = PluginConfig::default();
        let fetcher = StubFetcher::new();
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        assert_eq!(
            resolver.resolve("/main.js").await.unwrap(),
            Resolution::Bundle {
                key: "main.js",
                content: b"console.log(1)",
            }
        );
        assert_eq!(
            resolver.resolve("/assets/style.css").await.unwrap().content(),
            Some(&b"body{}"[..])
        );
    }

    #[tokio::test]
    async fn test_resolve_unstripped_key() {
        let bundle = bundle();
        let config = PluginConfig::new("/local/");
        let fetcher = StubFetcher::new();
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        // Prefix does not match, the path itself is the candidate key
        assert!(matches!(
            resolver.resolve("main.js").await.unwrap(),
            Resolution::Bundle { key: "main.js", .. }
        ));
    }

    #[tokio::test]
    async fn test_resolve_absolute_base_prefers_bundle() {
        let bundle = bundle();
        let config = PluginConfig::new("https://example.com/");
        let fetcher = StubFetcher::new();
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        let resolution = resolver.resolve("https://example.com/main.js").await.unwrap();
        assert!(matches!(resolution, Resolution::Bundle { key: "main.js", .. }));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_remote() {
        let bundle = bundle();
        let config = PluginConfig::default();
        let fetcher = StubFetcher::new().ok("https://cdn.example.com/lib.js", "lib()");
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        let resolution = resolver.resolve("https://cdn.example.com/lib.js").await.unwrap();
        assert_eq!(resolution, Resolution::Remote(b"lib()".to_vec()));
        assert_eq!(fetcher.requests(), vec!["https://cdn.example.com/lib.js"]);
    }

    #[tokio::test]
    async fn test_resolve_remote_failure() {
        let bundle = bundle();
        let config = PluginConfig::default();
        let fetcher = StubFetcher::new().status("https://cdn.example.com/gone.js", 500);
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        let err = resolver
            .resolve("https://cdn.example.com/gone.js")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let bundle = bundle();
        let config = PluginConfig::default();
        let fetcher = StubFetcher::new();
        let resolver = Resolver::new(&config, &bundle, &fetcher);

        assert_eq!(
            resolver.resolve("../lib/nonexistent.js").await.unwrap(),
            Resolution::NotFound
        );
        assert_eq!(resolver.resolve("").await.unwrap(), Resolution::NotFound);
        assert!(fetcher.requests().is_empty());
    }
}
