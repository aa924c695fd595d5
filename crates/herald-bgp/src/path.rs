//! Deterministic construction of the anycast `AnycastPath` attribute set
//! from a configured prefix (§4.4).
//!
//! Every field here is derived purely from [`herald_core::config::Prefix`],
//! with no dependence on session or peer state, so the same prefix always
//! builds the same path — this is what makes `AddPath`/`DeletePath` safe to
//! call repeatedly with the value built fresh each time rather than cached.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use routecore::asn::Asn;

use crate::error::{BgpError, Result};

static COMMUNITY_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());

/// `ORIGIN` path attribute value. Herald always originates routes locally,
/// so `Igp` is the only value the path builder ever emits; the other two
/// variants exist so the type mirrors the wire format completely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OriginType {
    Igp,
    Egp,
    Incomplete,
}

/// A fully-resolved BGP-4 NLRI plus path attributes for one anycast prefix,
/// ready to hand to [`crate::speaker::Speaker::add_path`].
#[derive(Clone, Debug)]
pub struct AnycastPath {
    pub network: IpAddr,
    pub prefix_len: u8,
    pub origin: OriginType,
    pub next_hop: IpAddr,
    pub communities: Vec<u32>,
    pub as_path_prepend: Vec<Asn>,
    pub multi_exit_discriminator: u32,
}

/// Build the path attribute set for `prefix`. Parses `ipAddress` as a CIDR
/// network and `nextHop` as a bare address; decodes each configured
/// community string per the three-step rule documented on
/// [`decode_communities`].
pub fn build_path(prefix: &herald_core::config::Prefix) -> Result<AnycastPath> {
    let (network, prefix_len) = parse_cidr(&prefix.ip_address)?;
    let next_hop = IpAddr::from_str(&prefix.next_hop).map_err(|e| BgpError::InvalidNextHop(
        prefix.next_hop.clone(),
        e.to_string(),
    ))?;

    Ok(AnycastPath {
        network,
        prefix_len,
        origin: OriginType::Igp,
        next_hop,
        communities: decode_communities(&prefix.communities),
        as_path_prepend: prefix.as_path_prepend.iter().map(|&a| Asn::from_u32(a)).collect(),
        multi_exit_discriminator: prefix.multi_exit_discriminator,
    })
}

fn parse_cidr(value: &str) -> Result<(IpAddr, u8)> {
    let (addr, len) = value.split_once('/').ok_or_else(|| {
        BgpError::InvalidPrefix(value.to_string(), "missing prefix length".to_string())
    })?;
    let address = IpAddr::from_str(addr)
        .map_err(|e| BgpError::InvalidPrefix(value.to_string(), e.to_string()))?;
    let prefix_len: u8 = len
        .parse()
        .map_err(|_| BgpError::InvalidPrefix(value.to_string(), "invalid prefix length".to_string()))?;
    let network = canonical_network(address, prefix_len, value)?;
    Ok((network, prefix_len))
}

/// Zero every host bit below `prefix_len` so the NLRI always carries the
/// canonical network address, never the literal (possibly host-bit-set)
/// address text (§4.4: "the NLRI carries the canonical network address and
/// prefix length").
fn canonical_network(address: IpAddr, prefix_len: u8, original: &str) -> Result<IpAddr> {
    match address {
        IpAddr::V4(v4) => {
            if prefix_len > 32 {
                return Err(BgpError::InvalidPrefix(
                    original.to_string(),
                    "prefix length exceeds 32 for an IPv4 address".to_string(),
                ));
            }
            let mask = if prefix_len == 0 { 0 } else { u32::MAX << (32 - prefix_len) };
            Ok(IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask)))
        }
        IpAddr::V6(v6) => {
            if prefix_len > 128 {
                return Err(BgpError::InvalidPrefix(
                    original.to_string(),
                    "prefix length exceeds 128 for an IPv6 address".to_string(),
                ));
            }
            let mask = if prefix_len == 0 { 0 } else { u128::MAX << (128 - prefix_len) };
            Ok(IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask)))
        }
    }
}

/// Decode each raw community string independently. For each entry:
///
/// 1. Parse as a bare decimal `u32` — used verbatim.
/// 2. Else match `hi:lo` (two decimal, 16-bit halves) and combine as
///    `(hi << 16) | lo` — the standard `asn:value` community encoding.
/// 3. Else drop the entry silently (logged at debug), matching the
///    source's behavior of never surfacing a malformed community as an
///    error.
pub fn decode_communities(raw: &[String]) -> Vec<u32> {
    let mut out = Vec::with_capacity(raw.len());
    for value in raw {
        if let Ok(n) = value.parse::<u32>() {
            out.push(n);
            continue;
        }
        if let Some(caps) = COMMUNITY_PAIR.captures(value) {
            let hi: Result<u32> = caps[1]
                .parse::<u16>()
                .map(|v| v as u32)
                .map_err(|e| BgpError::InvalidPrefix(value.clone(), e.to_string()));
            let lo: Result<u32> = caps[2]
                .parse::<u16>()
                .map(|v| v as u32)
                .map_err(|e| BgpError::InvalidPrefix(value.clone(), e.to_string()));
            if let (Ok(hi), Ok(lo)) = (hi, lo) {
                out.push((hi << 16) | lo);
                continue;
            }
        }
        tracing::debug!(community = %value, "dropping unparseable community");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_decimal() {
        assert_eq!(decode_communities(&["100".to_string()]), vec![100]);
    }

    #[test]
    fn decodes_asn_colon_value() {
        assert_eq!(decode_communities(&["65000:1".to_string()]), vec![(65000u32 << 16) | 1]);
    }

    #[test]
    fn drops_garbage() {
        assert!(decode_communities(&["not-a-community".to_string()]).is_empty());
    }

    #[test]
    fn parses_cidr() {
        let (addr, len) = parse_cidr("10.0.0.1/32").unwrap();
        assert_eq!(addr, IpAddr::from_str("10.0.0.1").unwrap());
        assert_eq!(len, 32);
    }

    #[test]
    fn rejects_missing_prefix_length() {
        assert!(parse_cidr("10.0.0.1").is_err());
    }

    #[test]
    fn masks_host_bits_to_canonical_network() {
        let (addr, len) = parse_cidr("10.0.0.1/24").unwrap();
        assert_eq!(addr, IpAddr::from_str("10.0.0.0").unwrap());
        assert_eq!(len, 24);
    }

    #[test]
    fn masks_ipv6_host_bits() {
        let (addr, len) = parse_cidr("2001:db8::1/32").unwrap();
        assert_eq!(addr, IpAddr::from_str("2001:db8::").unwrap());
        assert_eq!(len, 32);
    }

    #[test]
    fn rejects_ipv4_prefix_length_over_32() {
        assert!(parse_cidr("10.0.0.1/33").is_err());
    }
}
