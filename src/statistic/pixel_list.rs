/*
 * // Copyright (c) Radzivon Bartoshyk. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */

use crate::EffectError;

const LEVELS: usize = 9;
/// Index of the sentinel head; value nodes are indexed by the value itself.
const HEAD: u32 = 65536;
const NODES: usize = 65537;

#[derive(Copy, Clone, Default)]
struct SkipNode {
    next: [u32; LEVELS],
    count: u64,
    signature: u64,
}

/// Streaming order statistic window over the 16-bit value domain.
///
/// A skip list whose nodes are preallocated for every possible value, so an
/// insertion never allocates. Nodes carry the generation signature of the
/// window that last touched them, which makes [PixelList::reset] constant
/// time: stale nodes are simply re-initialized on their next insertion.
///
/// Every query assumes exactly `length` values were inserted since the last
/// reset.
pub struct PixelList {
    nodes: Vec<SkipNode>,
    level: usize,
    length: u64,
    seed: u64,
    signature: u64,
}

impl PixelList {
    /// List sized for a `width`×`height` window.
    pub fn new(width: usize, height: usize) -> Result<PixelList, EffectError> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(NODES)
            .map_err(|_| EffectError::MemoryAllocationFailed("pixel list"))?;
        nodes.resize(NODES, SkipNode::default());
        let mut list = PixelList {
            nodes,
            level: 0,
            length: (width.max(1) * height.max(1)) as u64,
            seed: 0,
            signature: 1,
        };
        list.reset();
        Ok(list)
    }

    /// Number of values a full window holds.
    #[inline]
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Starts a new window.
    pub fn reset(&mut self) {
        self.level = 0;
        self.nodes[HEAD as usize].next = [HEAD; LEVELS];
        self.seed = self.signature;
        self.signature = self.signature.wrapping_add(1);
    }

    #[inline]
    pub fn insert(&mut self, value: u16) {
        let node = &mut self.nodes[value as usize];
        if node.signature == self.signature {
            node.count += 1;
            return;
        }
        self.add_node(value as u32);
    }

    fn add_node(&mut self, value: u32) {
        let signature = self.signature;
        let node = &mut self.nodes[value as usize];
        node.signature = signature;
        node.count = 1;

        let mut update = [HEAD; LEVELS];
        let mut search = HEAD;
        for level in (0..=self.level).rev() {
            loop {
                let next = self.nodes[search as usize].next[level];
                if next >= value {
                    break;
                }
                search = next;
            }
            update[level] = search;
        }

        let mut level = 0usize;
        loop {
            self.seed = self.seed.wrapping_mul(42893621).wrapping_add(1);
            if self.seed & 0x300 != 0x300 {
                break;
            }
            level += 1;
        }
        level = level.min(8).min(self.level + 2);
        while level > self.level {
            self.level += 1;
            update[self.level] = HEAD;
        }

        for l in (0..=level).rev() {
            let previous = update[l] as usize;
            self.nodes[value as usize].next[l] = self.nodes[previous].next[l];
            self.nodes[previous].next[l] = value;
        }
    }

    /// Walks values in ascending order with their counts until `stop` holds
    /// for the running count.
    #[inline]
    fn walk(&self, mut visit: impl FnMut(u32, u64) -> bool) {
        let mut color = HEAD;
        loop {
            color = self.nodes[color as usize].next[0];
            if color == HEAD {
                break;
            }
            if !visit(color, self.nodes[color as usize].count) {
                break;
            }
        }
    }

    pub fn minimum(&self) -> u16 {
        let first = self.nodes[HEAD as usize].next[0];
        if first == HEAD {
            0
        } else {
            first as u16
        }
    }

    pub fn maximum(&self) -> u16 {
        let mut maximum = 0u32;
        let mut count = 0u64;
        self.walk(|color, n| {
            maximum = maximum.max(color);
            count += n;
            count < self.length
        });
        maximum as u16
    }

    pub fn mean(&self) -> u16 {
        let mut sum = 0f64;
        let mut count = 0u64;
        self.walk(|color, n| {
            sum += n as f64 * color as f64;
            count += n;
            count < self.length
        });
        (sum / self.length as f64) as u16
    }

    pub fn median(&self) -> u16 {
        let mut median = 0u32;
        let mut count = 0u64;
        self.walk(|color, n| {
            median = color;
            count += n;
            count <= self.length >> 1
        });
        median as u16
    }

    /// Most frequent value, the smallest one on ties.
    pub fn mode(&self) -> u16 {
        let mut mode = 0u32;
        let mut max_count = 0u64;
        let mut count = 0u64;
        self.walk(|color, n| {
            if n > max_count {
                mode = color;
                max_count = n;
            }
            count += n;
            count < self.length
        });
        mode as u16
    }

    /// Median, unless it is an extreme of the window: then its inner
    /// neighbour.
    pub fn nonpeak(&self) -> u16 {
        let mut previous = HEAD;
        let mut color = HEAD;
        let mut next = self.nodes[HEAD as usize].next[0];
        let mut count = 0u64;
        while next != HEAD {
            previous = color;
            color = next;
            next = self.nodes[color as usize].next[0];
            count += self.nodes[color as usize].count;
            if count > self.length >> 1 {
                break;
            }
        }
        if previous == HEAD && next != HEAD {
            color = next;
        } else if previous != HEAD && next == HEAD {
            color = previous;
        }
        if color == HEAD {
            0
        } else {
            color as u16
        }
    }

    pub fn root_mean_square(&self) -> u16 {
        let mut sum = 0f64;
        let mut count = 0u64;
        self.walk(|color, n| {
            sum += n as f64 * color as f64 * color as f64;
            count += n;
            count < self.length
        });
        (sum / self.length as f64).sqrt() as u16
    }

    pub fn standard_deviation(&self) -> u16 {
        let mut sum = 0f64;
        let mut sum_squared = 0f64;
        let mut count = 0u64;
        self.walk(|color, n| {
            let color = color as f64;
            sum += n as f64 * color;
            sum_squared += n as f64 * color * color;
            count += n;
            count < self.length
        });
        let length = self.length as f64;
        let mean = sum / length;
        (sum_squared / length - mean * mean).max(0.0).sqrt() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[u16]) -> PixelList {
        let mut list = PixelList::new(values.len(), 1).unwrap();
        list.reset();
        for &v in values {
            list.insert(v);
        }
        list
    }

    #[test]
    fn test_order_statistics() {
        let list = filled(&[3, 1, 5, 2, 1]);
        assert_eq!(list.median(), 2);
        assert_eq!(list.mode(), 1);
        assert_eq!(list.minimum(), 1);
        assert_eq!(list.maximum(), 5);
        assert_eq!(list.mean(), 2);
        assert_eq!(list.root_mean_square(), 2);
        assert_eq!(list.standard_deviation(), 1);
    }

    #[test]
    fn test_reset_reproduces_results() {
        let values: Vec<u16> = (0..49).map(|i| ((i * 7919) % 65536) as u16).collect();
        let mut list = PixelList::new(7, 7).unwrap();
        for &v in values.iter() {
            list.insert(v);
        }
        let first = (list.minimum(), list.median(), list.maximum(), list.mode());
        list.reset();
        for &v in [9u16, 9, 9].iter() {
            list.insert(v);
        }
        list.reset();
        for &v in values.iter() {
            list.insert(v);
        }
        let second = (list.minimum(), list.median(), list.maximum(), list.mode());
        assert_eq!(first, second);
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(first.0, sorted[0]);
        assert_eq!(first.1, sorted[24]);
        assert_eq!(first.2, sorted[48]);
    }

    #[test]
    fn test_nonpeak_avoids_extremes() {
        let list = filled(&[10, 10, 10, 20, 30]);
        assert_eq!(list.median(), 10);
        assert_eq!(list.nonpeak(), 20);
        let list = filled(&[10, 20, 30, 30, 30]);
        assert_eq!(list.median(), 30);
        assert_eq!(list.nonpeak(), 20);
        let list = filled(&[10, 20, 20, 20, 30]);
        assert_eq!(list.nonpeak(), 20);
    }

    #[test]
    fn test_full_range_values() {
        let list = filled(&[0, 65535, 65535]);
        assert_eq!(list.minimum(), 0);
        assert_eq!(list.maximum(), 65535);
        assert_eq!(list.median(), 65535);
    }
}
