// Option profiles and fetch strategies
//
// Profiles are built once from the flags yt-dlp advertises in `--help` and are
// never mutated afterward. A flag the tool does not know is dropped silently.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

lazy_static! {
    static ref LONG_FLAG_RE: Regex = Regex::new(r"--[A-Za-z0-9][A-Za-z0-9-]*").unwrap();
}

/// Long flags the fetch tool advertises
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    flags: BTreeSet<String>,
}

impl Capabilities {
    /// Collect every `--flag` mentioned in the tool's help output
    pub fn from_help(help: &str) -> Self {
        Self {
            flags: LONG_FLAG_RE
                .find_iter(help)
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }

    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supports(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Where credential-assisted attempts get their session from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Browser profile name passed to `--cookies-from-browser`
    Browser(String),
    /// Netscape cookies file passed to `--cookies`
    File(PathBuf),
}

/// Already-resolved process toggles that shape the profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings {
    pub use_cookies: bool,
    pub credentials: CredentialSource,
    pub force_ipv4: bool,
    pub user_agent: Option<String>,
    pub player_client: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            use_cookies: false,
            credentials: CredentialSource::Browser("chrome".to_string()),
            force_ipv4: false,
            user_agent: None,
            player_client: "android".to_string(),
        }
    }
}

/// One fetch strategy, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Baseline, with native segment handling when supported
    Direct,
    /// Alternate client identity
    AlternateClient,
    /// Credentials alone
    Credentials,
    /// Credentials plus native segment handling
    CredentialsNative,
    /// Credentials plus alternate client identity
    CredentialsAlternateClient,
}

impl Strategy {
    pub const ORDER: [Strategy; 5] = [
        Strategy::Direct,
        Strategy::AlternateClient,
        Strategy::Credentials,
        Strategy::CredentialsNative,
        Strategy::CredentialsAlternateClient,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::AlternateClient => "alternate-client",
            Self::Credentials => "cookies",
            Self::CredentialsNative => "cookies+native",
            Self::CredentialsAlternateClient => "cookies+alternate-client",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The immutable option sets for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profiles {
    baseline: Vec<String>,
    native: Option<Vec<String>>,
    alternate_client: Option<Vec<String>>,
    credentials: Option<Vec<String>>,
}

impl Profiles {
    pub fn build(caps: &Capabilities, settings: &ProfileSettings) -> Self {
        let mut baseline = Vec::new();
        push_flag(caps, &mut baseline, "--no-playlist", None);
        push_flag(caps, &mut baseline, "--retries", Some("5"));
        push_flag(caps, &mut baseline, "--fragment-retries", Some("50"));
        push_flag(caps, &mut baseline, "--merge-output-format", Some("mp4"));
        if settings.force_ipv4 {
            push_flag(caps, &mut baseline, "--force-ipv4", None);
        }
        if let Some(ua) = &settings.user_agent {
            push_flag(caps, &mut baseline, "--user-agent", Some(ua.as_str()));
        }

        let native = gated(caps, "--hls-prefer-native", None);

        let client_arg = format!("youtube:player_client={}", settings.player_client);
        let alternate_client = gated(caps, "--extractor-args", Some(client_arg.as_str()));

        let credentials = if settings.use_cookies {
            match &settings.credentials {
                CredentialSource::Browser(browser) => {
                    gated(caps, "--cookies-from-browser", Some(browser.as_str()))
                }
                CredentialSource::File(path) => {
                    gated(caps, "--cookies", Some(path.to_string_lossy().as_ref()))
                }
            }
        } else {
            None
        };

        Self {
            baseline,
            native,
            alternate_client,
            credentials,
        }
    }

    pub fn baseline(&self) -> &[String] {
        &self.baseline
    }

    /// Whether any credential-assisted strategy is in the cascade
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Extra options for `strategy`, or `None` when it does not apply
    pub fn extras(&self, strategy: Strategy) -> Option<Vec<String>> {
        match strategy {
            Strategy::Direct => Some(self.native.clone().unwrap_or_default()),
            Strategy::AlternateClient => self.alternate_client.clone(),
            Strategy::Credentials => self.credentials.clone(),
            Strategy::CredentialsNative => {
                join(self.credentials.as_deref(), self.native.as_deref())
            }
            Strategy::CredentialsAlternateClient => {
                join(self.credentials.as_deref(), self.alternate_client.as_deref())
            }
        }
    }

    /// Applicable strategies with their extra options, in cascade order
    pub fn strategies(&self) -> Vec<(Strategy, Vec<String>)> {
        Strategy::ORDER
            .iter()
            .filter_map(|s| self.extras(*s).map(|extra| (*s, extra)))
            .collect()
    }
}

fn join(first: Option<&[String]>, second: Option<&[String]>) -> Option<Vec<String>> {
    let (first, second) = (first?, second?);
    Some(first.iter().chain(second).cloned().collect())
}

fn gated(caps: &Capabilities, flag: &str, value: Option<&str>) -> Option<Vec<String>> {
    let mut out = Vec::new();
    push_flag(caps, &mut out, flag, value);
    (!out.is_empty()).then_some(out)
}

fn push_flag(caps: &Capabilities, out: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if !caps.supports(flag) {
        tracing::debug!("fetch tool does not advertise {}, skipping", flag);
        return;
    }
    out.push(flag.to_string());
    if let Some(v) = value {
        out.push(v.to_string());
    }
}
