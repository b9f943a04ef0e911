//! Soul assignment for role templates.
//!
//! Precedence, first hit wins:
//! 1. pinned soul, exact name
//! 2. pinned soul, normalized name
//! 3. pinned but unmatched: souls tagged with the role's `crew_title`
//! 4. nothing pinned: tagged souls, else souls whose name mentions the role,
//!    else every soul
//!
//! Steps 3 and 4 pick uniformly at random from the candidate set.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_yaml::Mapping;
use tracing::debug;

use crate::frontmatter;
use crate::soul::SoulProfile;

use super::template::RoleTemplate;

/// Pick the soul for `template` from `souls`.
pub fn resolve_soul<'a, R: Rng + ?Sized>(
    template: &RoleTemplate,
    souls: &'a [SoulProfile],
    rng: &mut R,
) -> Option<&'a SoulProfile> {
    let role_id = template.role_id();

    let candidates: Vec<&SoulProfile> = match template.default_soul() {
        Some(pinned) => {
            if let Some(soul) = find_pinned(&pinned, souls) {
                return Some(soul);
            }
            debug!(role = role_id, soul = %pinned, "Pinned soul not found, falling back to tagged souls");
            tagged(role_id, souls)
        }
        None => {
            let tagged = tagged(role_id, souls);
            if !tagged.is_empty() {
                tagged
            } else {
                let named = mentioning(role_id, souls);
                if !named.is_empty() {
                    named
                } else {
                    souls.iter().collect()
                }
            }
        }
    };

    candidates.choose(rng).copied()
}

/// Exact, then normalized, name lookup for a pinned soul.
pub fn find_pinned<'a>(pinned: &str, souls: &'a [SoulProfile]) -> Option<&'a SoulProfile> {
    if let Some(soul) = souls.iter().find(|s| s.name == pinned) {
        return Some(soul);
    }

    let wanted = normalize_name(pinned);
    let wanted_raw = pinned.trim().to_lowercase();
    souls.iter().find(|s| {
        normalize_name(&s.name) == wanted || s.name.replace(' ', "_").to_lowercase() == wanted_raw
    })
}

fn tagged<'a>(role_id: &str, souls: &'a [SoulProfile]) -> Vec<&'a SoulProfile> {
    souls
        .iter()
        .filter(|s| s.crew_title().as_deref() == Some(role_id))
        .collect()
}

fn mentioning<'a>(role_id: &str, souls: &'a [SoulProfile]) -> Vec<&'a SoulProfile> {
    let needle = role_id.to_lowercase();
    souls
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.declared_name()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect()
}

/// `Alex_Rivera`, `alex-rivera` and ` Alex Rivera ` all become `alex rivera`.
pub fn normalize_name(name: &str) -> String {
    name.replace(['_', '-'], " ").to_lowercase().trim().to_string()
}

/// Lowercase, non-alphanumerics collapsed to a single `_`.
pub fn safe_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Template metadata with the soul baked in.
pub fn apply_soul(template: &RoleTemplate, soul: &SoulProfile) -> Mapping {
    let mut metadata = template.metadata().clone();
    let name = soul
        .declared_name()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| safe_file_name(&soul.name));

    frontmatter::set_string(&mut metadata, "soul", soul.name.clone());
    frontmatter::set_string(&mut metadata, "name", name);
    frontmatter::set_string(&mut metadata, "crew_title", template.role_id());
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;

    fn template(role: &str, content: &str) -> RoleTemplate {
        RoleTemplate::from_content(Path::new(&format!("/sys/{role}.md")), content.to_string())
    }

    fn named(name: &str, declared: &str) -> SoulProfile {
        let mut meta = Mapping::new();
        frontmatter::set_string(&mut meta, "name", declared);
        SoulProfile::new(name).with_metadata(meta)
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alex_Rivera"), "alex rivera");
        assert_eq!(normalize_name(" alex-rivera "), "alex rivera");
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Alex Rivera"), "alex_rivera");
        assert_eq!(safe_file_name("  Dr. Mia -- Chen!"), "dr_mia_chen");
    }

    #[test]
    fn test_exact_beats_tagged() {
        let souls = vec![
            SoulProfile::tagged("Other", "director"),
            SoulProfile::new("Alex Rivera"),
        ];
        let t = template("director", "---\nsoul: Alex Rivera\n---\n");
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "Alex Rivera");
        }
    }

    #[test]
    fn test_normalized_pin() {
        let souls = vec![SoulProfile::new("Alex Rivera")];
        let t = template("director", "---\nsoul: alex_rivera\n---\n");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "Alex Rivera");

        let souls = vec![SoulProfile::new("mia chen")];
        assert!(find_pinned("MIA_CHEN", &souls).is_some());
    }

    #[test]
    fn test_unmatched_pin_uses_tagged_only() {
        let souls = vec![SoulProfile::tagged("s1", "editor"), SoulProfile::new("editor fan")];
        let t = template("editor", "---\nsoul: Nobody\n---\n");
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "s1");

        let untagged = vec![SoulProfile::new("editor fan")];
        assert!(resolve_soul(&t, &untagged, &mut rng).is_none());
    }

    #[test]
    fn test_no_pin_fallbacks() {
        let mut rng = StdRng::seed_from_u64(7);
        let t = template("editor", "Body");

        let souls = vec![SoulProfile::new("Film Editor Sam"), SoulProfile::new("Zed")];
        assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "Film Editor Sam");

        let souls = vec![named("x1", "Chief Editor"), SoulProfile::new("Zed")];
        assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "x1");

        let souls = vec![SoulProfile::new("Zed")];
        assert_eq!(resolve_soul(&t, &souls, &mut rng).unwrap().name, "Zed");

        assert!(resolve_soul(&t, &[], &mut rng).is_none());
    }

    #[test]
    fn test_apply_soul() {
        let t = template("director", "---\ndescription: Leads\nsoul: old\n---\nBody");
        let meta = apply_soul(&t, &SoulProfile::new("Alex Rivera"));
        assert_eq!(frontmatter::get_string(&meta, "soul").as_deref(), Some("Alex Rivera"));
        assert_eq!(frontmatter::get_string(&meta, "name").as_deref(), Some("alex_rivera"));
        assert_eq!(frontmatter::get_string(&meta, "crew_title").as_deref(), Some("director"));
        let keys: Vec<_> = meta.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["description", "soul", "name", "crew_title"]);

        let meta = apply_soul(&t, &named("alex", "Alex R."));
        assert_eq!(frontmatter::get_string(&meta, "name").as_deref(), Some("Alex R."));
    }
}
