//! Social-profile links, one per platform.

use url::Url;

struct Platform {
    name: &'static str,
    hosts: &'static [&'static str],
    /// Path prefixes for share and intent links rather than profiles.
    disallowed: &'static [&'static str],
}

const PLATFORMS: &[Platform] = &[
    Platform {
        name: "Facebook",
        hosts: &["facebook.com", "fb.com"],
        disallowed: &["/sharer", "/share", "/dialog", "/plugins"],
    },
    Platform {
        name: "Instagram",
        hosts: &["instagram.com"],
        disallowed: &[],
    },
    Platform {
        name: "LinkedIn",
        hosts: &["linkedin.com"],
        disallowed: &["/sharearticle", "/share"],
    },
    Platform {
        name: "X",
        hosts: &["twitter.com", "x.com"],
        disallowed: &["/intent", "/share", "/home"],
    },
    Platform {
        name: "TikTok",
        hosts: &["tiktok.com"],
        disallowed: &[],
    },
    Platform {
        name: "YouTube",
        hosts: &["youtube.com", "youtu.be"],
        disallowed: &["/watch", "/embed"],
    },
    Platform {
        name: "Vimeo",
        hosts: &["vimeo.com"],
        disallowed: &[],
    },
    Platform {
        name: "Flickr",
        hosts: &["flickr.com"],
        disallowed: &[],
    },
    Platform {
        name: "Foursquare",
        hosts: &["foursquare.com"],
        disallowed: &[],
    },
    Platform {
        name: "Threads",
        hosts: &["threads.net", "threads.com"],
        disallowed: &["/intent"],
    },
    Platform {
        name: "Tumblr",
        hosts: &["tumblr.com"],
        disallowed: &["/share", "/widgets"],
    },
    Platform {
        name: "Pinterest",
        hosts: &["pinterest.com"],
        disallowed: &["/pin/create"],
    },
];

fn platform_for(host: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| {
        p.hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
    })
}

/// Canonical `https://host/path[?query]` for a profile link, with the
/// platform name. `None` for non-social, share, or bare-root links.
#[must_use]
pub fn canonical_profile(url: &Url) -> Option<(&'static str, String)> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let raw_host = url.host_str()?.to_ascii_lowercase();
    let host = raw_host
        .strip_prefix("www.")
        .or_else(|| raw_host.strip_prefix("m."))
        .unwrap_or(&raw_host);
    let platform = platform_for(host)?;

    let path = url.path().trim_end_matches('/');
    if path.split('/').all(str::is_empty) {
        return None;
    }
    let lowered = path.to_ascii_lowercase();
    if platform
        .disallowed
        .iter()
        .any(|prefix| lowered.starts_with(&prefix.to_ascii_lowercase()))
    {
        return None;
    }

    let mut canonical = format!("https://{host}{path}");
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        canonical.push('?');
        canonical.push_str(query);
    }
    Some((platform.name, canonical))
}

/// `Platform: url` lines, first URL per platform winning, in the order the
/// candidates are given.
#[must_use]
pub fn extract_social<'a, I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Url>,
{
    let mut seen_platforms: Vec<&'static str> = Vec::new();
    let mut lines = Vec::new();
    for url in candidates {
        let Some((platform, canonical)) = canonical_profile(url) else {
            continue;
        };
        if seen_platforms.contains(&platform) {
            continue;
        }
        seen_platforms.push(platform);
        lines.push(format!("{platform}: {canonical}"));
    }
    lines
}
