//! Accreditation seal detection.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static ACCREDITED_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bBBB Accredited\b").expect("valid regex"));

static DISCLAIMER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)site\s+managed\s+by\s+bbb").expect("valid regex"));

const IMAGE_MARKERS: &[&str] = &["bbb", "accredited", "sscc-bbb-logos-footer"];

/// True when any image file name carries a seal marker, or some page uses
/// the accreditation phrase without a managed-by disclaimer on that same page.
#[must_use]
pub fn detect_seal<'a, I, T>(images: I, page_texts: T) -> bool
where
    I: IntoIterator<Item = &'a Url>,
    T: IntoIterator<Item = &'a str>,
{
    let image_hit = images.into_iter().any(|img| {
        let file = img
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_ascii_lowercase();
        IMAGE_MARKERS.iter().any(|m| file.contains(m))
    });
    image_hit || page_texts.into_iter().any(page_claims_accreditation)
}

fn page_claims_accreditation(text: &str) -> bool {
    ACCREDITED_TEXT_RE.is_match(text) && !DISCLAIMER_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_file_name_marks_seal() {
        let imgs = [Url::parse("https://cdn.example.com/img/BBB-Seal.png").unwrap()];
        assert!(detect_seal(&imgs, [""]));
    }

    #[test]
    fn directory_names_alone_do_not_count() {
        let imgs = [Url::parse("https://example.com/bbb/logo.png").unwrap()];
        assert!(!detect_seal(&imgs, ["Welcome"]));
    }

    #[test]
    fn accreditation_text_counts_unless_disclaimed() {
        assert!(detect_seal(&[], ["We are a BBB Accredited Business."]));
        assert!(!detect_seal(
            &[],
            ["BBB Accredited Business directory. Site managed by BBB Marketing."]
        ));
    }

    #[test]
    fn disclaimer_on_another_page_does_not_cancel_accreditation() {
        let pages = [
            "We are a BBB Accredited Business since 2001.",
            "Partner directory. Site managed by BBB of Ohio.",
        ];
        assert!(detect_seal(&[], pages));
    }
}
