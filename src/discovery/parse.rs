//! Neighbor table parsing
//!
//! The layouts differ per platform but every row of interest has an IPv4
//! address and a hardware address on the same line:
//!
//! ```text
//! Windows `arp -a`:      192.168.1.40      00-08-dc-1a-2b-3c     dynamic
//! macOS/BSD `arp -an`:   ? (192.168.1.40) at 0:8:dc:1a:2b:3c on en0 ifscope [ethernet]
//! Linux `arp -an`:       ? (192.168.1.40) at 00:08:dc:1a:2b:3c [ether] on eth0
//! Linux /proc/net/arp:   192.168.1.40  0x1  0x2  00:08:dc:1a:2b:3c  *  eth0
//! ```

use std::net::Ipv4Addr;

use super::{MacAddress, NeighborEntry, Oui};

/// Parse `N` hex octets separated by `-` or `:`, each one or two digits
pub(crate) fn parse_octets<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut octets = [0u8; N];
    let mut parts = s.split(|c: char| c == '-' || c == ':');

    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 2 {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

fn parse_line(line: &str) -> Option<NeighborEntry> {
    let mut ip = None;
    let mut mac = None;

    for token in line.split_whitespace() {
        if ip.is_none() {
            let bare = token.trim_start_matches('(').trim_end_matches(')');
            if let Ok(addr) = bare.parse::<Ipv4Addr>() {
                ip = Some(addr);
                continue;
            }
        }
        if mac.is_none() {
            if let Ok(addr) = token.parse::<MacAddress>() {
                mac = Some(addr);
            }
        }
    }

    Some(NeighborEntry { ip: ip?, mac: mac? })
}

/// All entries of a neighbor table, in table order
pub fn parse_neighbor_table(text: &str) -> Vec<NeighborEntry> {
    text.lines().filter_map(parse_line).collect()
}

/// Entries whose hardware address starts with `oui`, in table order
pub fn matching_entries(text: &str, oui: Oui) -> Vec<NeighborEntry> {
    parse_neighbor_table(text)
        .into_iter()
        .filter(|entry| entry.mac.oui() == oui)
        .collect()
}
