use std::collections::{BTreeMap, HashSet};
use url::Url;

// * Normalizes an absolute URL to a unique, deterministic representation.
// * Inventory deduplication and the health cache key on this form.
// *
// * Logic:
// * 1. Parse (absolute URLs only - sitemap locs and checker inputs are absolute).
// * 2. Strip Fragment (#).
// * 3. Lowercase Hostname.
// * 4. Remove Tracking Parameters (utm_*, gclid, etc.).
// * 5. Sort Query Parameters alphabetically.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;

    // * Fragments are client-side only and irrelevant for link identity.
    url.set_fragment(None);

    // * DNS is case-insensitive, but string hashing is not.
    if let Some(host) = url.host_str() {
        let lower_host = host.to_lowercase();
        if url.set_host(Some(&lower_host)).is_err() {
            return None;
        }
    }

    // * BTreeMap sorts keys alphabetically for free.
    let mut clean_pairs = BTreeMap::new();

    let drop_params: HashSet<&str> = [
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "utm_term",
        "utm_content",
        "gclid",
        "fbclid",
        "ref",
        "yclid",
        "_ga",
    ]
    .into();

    for (k, v) in url.query_pairs() {
        let key_lower = k.to_lowercase();
        if !drop_params.contains(key_lower.as_str()) {
            clean_pairs.insert(k.into_owned(), v.into_owned());
        }
    }

    if clean_pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url.query_pairs_mut();
        serializer.clear();
        for (k, v) in clean_pairs {
            serializer.append_pair(&k, &v);
        }
    }

    Some(url.to_string())
}
