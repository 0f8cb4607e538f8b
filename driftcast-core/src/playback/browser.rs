//! Browser identification from user-agent strings.
//!
//! The playback policy only needs a coarse browser family and a version
//! number to look up container support, so parsing is a short ordered list
//! of regexes rather than a full user-agent database. Order matters: Chrome
//! advertises Safari, Android advertises Chrome, so the more specific
//! families are tried first.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Browser family of a requesting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Firefox,
    Opera,
    Chrome,
    Safari,
    Msie,
    Android,
    Iphone,
    Itunes,
    Unknown,
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Firefox => "firefox",
            Browser::Opera => "opera",
            Browser::Chrome => "chrome",
            Browser::Safari => "safari",
            Browser::Msie => "msie",
            Browser::Android => "android",
            Browser::Iphone => "iphone",
            Browser::Itunes => "itunes",
            Browser::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

struct BrowserPattern {
    browser: Browser,
    pattern: &'static str,
}

/// Ordered detection table. The first matching entry wins; its capture
/// group, when present, is the version number.
const PATTERNS: [BrowserPattern; 8] = [
    BrowserPattern {
        browser: Browser::Itunes,
        pattern: r"(?i)itunes/(\d+(?:\.\d+)?)",
    },
    BrowserPattern {
        browser: Browser::Android,
        pattern: r"(?i)android[ /]?(\d+(?:\.\d+)?)?",
    },
    BrowserPattern {
        browser: Browser::Iphone,
        pattern: r"(?i)ip(?:hone|od|ad)(?:.*?os (\d+)(?:_(\d+))?)?",
    },
    // Opera >= 10 hides its version behind a trailing "Version/" token
    BrowserPattern {
        browser: Browser::Opera,
        pattern: r"(?i)opera.*?version/(\d+(?:\.\d+)?)|opera[/ ](\d+(?:\.\d+)?)|opr/(\d+(?:\.\d+)?)",
    },
    BrowserPattern {
        browser: Browser::Msie,
        pattern: r"(?i)msie (\d+(?:\.\d+)?)",
    },
    BrowserPattern {
        browser: Browser::Firefox,
        pattern: r"(?i)firefox/(\d+(?:\.\d+)?)",
    },
    BrowserPattern {
        browser: Browser::Chrome,
        pattern: r"(?i)chrome/(\d+(?:\.\d+)?)",
    },
    // Safari versions are compared by WebKit build number (e.g. 522+),
    // which is more reliable than the marketing version.
    BrowserPattern {
        browser: Browser::Safari,
        pattern: r"(?i)applewebkit/(\d+(?:\.\d+)?)",
    },
];

static COMPILED: LazyLock<Vec<(Browser, Regex)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|entry| {
            let regex = Regex::new(entry.pattern).expect("valid browser pattern");
            (entry.browser, regex)
        })
        .collect()
});

/// Parses a user-agent string into a browser family and version.
///
/// Unrecognized agents come back as `(Browser::Unknown, 0.0)`; a matched
/// family with no parseable version gets version `0.0`.
pub fn parse_user_agent(user_agent: &str) -> (Browser, f64) {
    for (browser, regex) in COMPILED.iter() {
        if let Some(captures) = regex.captures(user_agent) {
            let version = match *browser {
                // iOS reports "OS 4_2"; treat the underscore as a decimal point
                Browser::Iphone => match (captures.get(1), captures.get(2)) {
                    (Some(major), Some(minor)) => {
                        format!("{}.{}", major.as_str(), minor.as_str())
                            .parse()
                            .unwrap_or(0.0)
                    }
                    (Some(major), None) => major.as_str().parse().unwrap_or(0.0),
                    _ => 0.0,
                },
                // First populated capture group, patterns with alternations
                // included
                _ => captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0.0),
            };
            return (*browser, version);
        }
    }
    (Browser::Unknown, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firefox() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64; rv:3.5) Gecko/20090624 Firefox/3.5";
        assert_eq!(parse_user_agent(ua), (Browser::Firefox, 3.5));
    }

    #[test]
    fn test_chrome_wins_over_safari_token() {
        let ua = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/6.0.472.63 Safari/537.36";
        assert_eq!(parse_user_agent(ua), (Browser::Chrome, 6.0));
    }

    #[test]
    fn test_safari_reports_webkit_build() {
        let ua = "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_5_8) AppleWebKit/531.22.7 \
                  (KHTML, like Gecko) Version/4.0.5 Safari/531.22.7";
        let (browser, version) = parse_user_agent(ua);
        assert_eq!(browser, Browser::Safari);
        assert!(version >= 531.0);
    }

    #[test]
    fn test_android_wins_over_chrome_token() {
        let ua = "Mozilla/5.0 (Linux; Android 4.4.2; Nexus 5) AppleWebKit/537.36 \
                  Chrome/33.0.0.0 Mobile Safari/537.36";
        let (browser, version) = parse_user_agent(ua);
        assert_eq!(browser, Browser::Android);
        assert_eq!(version, 4.4);
    }

    #[test]
    fn test_iphone_os_version_uses_underscore() {
        let ua = "Mozilla/5.0 (iPhone; U; CPU iPhone OS 4_2 like Mac OS X) AppleWebKit/533.17.9";
        assert_eq!(parse_user_agent(ua), (Browser::Iphone, 4.2));
    }

    #[test]
    fn test_itunes() {
        let ua = "iTunes/10.1 (Windows; Microsoft Windows 7)";
        assert_eq!(parse_user_agent(ua), (Browser::Itunes, 10.1));
    }

    #[test]
    fn test_opera_classic_and_blink() {
        assert_eq!(
            parse_user_agent("Opera/9.80 (X11; Linux) Presto/2.6.30 Version/10.60"),
            (Browser::Opera, 10.6)
        );
        assert_eq!(
            parse_user_agent("Opera/9.64 (Windows NT 5.1; U; en) Presto/2.1.1"),
            (Browser::Opera, 9.64)
        );
        let (browser, _) =
            parse_user_agent("Mozilla/5.0 AppleWebKit/537.36 Chrome/45.0 OPR/32.0.1948.69");
        assert_eq!(browser, Browser::Opera);
    }

    #[test]
    fn test_msie() {
        let ua = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1)";
        assert_eq!(parse_user_agent(ua), (Browser::Msie, 8.0));
    }

    #[test]
    fn test_unknown_agent() {
        assert_eq!(parse_user_agent("curl/7.68.0"), (Browser::Unknown, 0.0));
        assert_eq!(parse_user_agent(""), (Browser::Unknown, 0.0));
    }
}
