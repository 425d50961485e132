//! Address block enumeration
//!
//! Blocks are walked from the network address upward by incrementing the
//! lowest-order byte and carrying into the next one.

use ipnet::IpNet;
use reachscan_common::{ReachError, ReachResult};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Number of addresses covered by `net`, saturating at `u128::MAX` for `::/0`.
pub(crate) fn block_size(net: &IpNet) -> u128 {
    let host_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

/// Expand `raw` (e.g. `10.0.0.0/24`, `fd00::/126`) into concrete addresses.
///
/// IPv4 blocks with more than two addresses drop the network and broadcast
/// address. IPv6 blocks and /31, /32 keep everything.
pub(crate) fn expand_block(raw: &str, limit: u128) -> ReachResult<Vec<IpAddr>> {
    let net: IpNet = raw.parse().map_err(|e: ipnet::AddrParseError| ReachError::BlockParse {
        block: raw.to_string(),
        reason: e.to_string(),
    })?;

    let size = block_size(&net);
    let too_large = || ReachError::BlockTooLarge {
        block: raw.to_string(),
        size,
        limit,
    };
    if size > limit {
        return Err(too_large());
    }
    let count = usize::try_from(size).map_err(|_| too_large())?;

    let addrs = match net {
        IpNet::V4(v4) => {
            let all = walk(v4.network().octets(), count, |o| IpAddr::V4(Ipv4Addr::from(o)));
            trim_ipv4_edges(all)
        }
        IpNet::V6(v6) => walk(v6.network().octets(), count, |o| IpAddr::V6(Ipv6Addr::from(o))),
    };
    Ok(addrs)
}

fn walk<const N: usize>(
    start: [u8; N],
    count: usize,
    to_ip: impl Fn([u8; N]) -> IpAddr,
) -> Vec<IpAddr> {
    let mut out = Vec::with_capacity(count);
    let mut cursor = start;
    for i in 0..count {
        out.push(to_ip(cursor));
        if i + 1 < count {
            increment(&mut cursor);
        }
    }
    out
}

/// Add one to a big-endian byte string, carrying across byte boundaries.
fn increment(octets: &mut [u8]) {
    for byte in octets.iter_mut().rev() {
        let (next, carry) = byte.overflowing_add(1);
        *byte = next;
        if !carry {
            break;
        }
    }
}

fn trim_ipv4_edges(mut addrs: Vec<IpAddr>) -> Vec<IpAddr> {
    if addrs.len() > 2 {
        addrs.pop();
        addrs.remove(0);
    }
    addrs
}
