//! Stitching relation member ways into closed rings.

use geo::{Coord, LineString};

/// Join way segments that share endpoints into closed rings.
///
/// Segments may arrive in any order and direction. Chains that cannot be
/// closed are closed with a straight edge if they still span at least three
/// distinct positions; shorter leftovers are dropped.
pub fn stitch_rings(segments: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut rings = Vec::new();
    let mut pending: Vec<Vec<Coord<f64>>> = segments.into_iter().filter(|s| s.len() >= 2).collect();

    while !pending.is_empty() {
        let mut chain = pending.remove(0);

        while !is_closed(&chain) {
            let Some(i) = pending.iter().position(|s| touches(&chain, s)) else {
                break;
            };
            let segment = pending.remove(i);
            attach(&mut chain, segment);
        }

        if chain.len() >= 3 && chain.first() != chain.last() {
            chain.push(chain[0]);
        }
        if chain.len() >= 4 {
            rings.push(LineString::new(chain));
        }
    }

    rings
}

fn is_closed(chain: &[Coord<f64>]) -> bool {
    chain.len() >= 4 && chain.first() == chain.last()
}

fn touches(chain: &[Coord<f64>], segment: &[Coord<f64>]) -> bool {
    let ends = [chain.first(), chain.last()];
    ends.contains(&segment.first()) || ends.contains(&segment.last())
}

/// Append or prepend `segment`, reversing it when needed, without
/// duplicating the shared endpoint
fn attach(chain: &mut Vec<Coord<f64>>, mut segment: Vec<Coord<f64>>) {
    let (head, tail) = (chain[0], chain[chain.len() - 1]);
    let (first, last) = (segment[0], segment[segment.len() - 1]);

    if tail == first {
        chain.extend(segment.into_iter().skip(1));
    } else if tail == last {
        segment.reverse();
        chain.extend(segment.into_iter().skip(1));
    } else if head == last {
        segment.pop();
        segment.append(chain);
        *chain = segment;
    } else if head == first {
        segment.reverse();
        segment.pop();
        segment.append(chain);
        *chain = segment;
    }
}
