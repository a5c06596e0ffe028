use std::fmt::Write as _;

/// Percent-encode `s` the way a browser's `encodeURI` does: URI-reserved and
/// unreserved characters pass through, every other byte becomes `%XX`.
pub fn encode_uri(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || b";,/?:@&=+$-_.!~*'()#".contains(&byte) {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Link to a group's listing.
pub fn group_link(group: &str) -> String {
    format!("/dags/?group={}", encode_uri(group))
}

/// Link to a workflow's detail page, keeping the current group scope.
pub fn workflow_link(file_stem: &str, group: &str) -> String {
    format!(
        "/dags/{}?group={}",
        encode_uri(file_stem),
        encode_uri(group)
    )
}

/// Extract the `group` query parameter from a link built by [`group_link`].
pub fn group_from_link(link: &str) -> Option<String> {
    let query = link.split_once('?')?.1;
    let value = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("group="))?;
    decode_percent(value)
}

fn decode_percent(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
