//! Block kernel: one 8x8 block advanced through sixteen table lookups.
//!
//! The block is covered by sixteen 2x2 cores, one per 4-bit group of the
//! block word. For each core the kernel gathers the 16 cells of its 4x4
//! window, which may reach into the three neighbor blocks on that corner,
//! and reads the next core from the [`TransitionTable`]. Gather positions are
//! resolved at compile time and merged into groups of bits that share a
//! source word and a shift, so each window costs a handful of mask/shift
//! steps.

use super::block::{BLOCK_SIZE, BLOCK_SIZE_I32, SHIFT};
use super::lookup::{CODE_OFFSETS, TransitionTable};

/// The center block and its neighbors, row-major with `y` growing downward:
///
/// ```text
/// NW N NE
///  W C E
/// SW S SE
/// ```
pub type Neighborhood = [u64; 9];

pub const CENTER: usize = 4;

/// Code bits that share one source word and one shift distance, so they move
/// into place with a single mask and shift.
#[derive(Clone, Copy)]
struct Group {
    word: u8,
    mask: u64,
    /// Code bit minus source bit.
    shift: i8,
}

const MAX_GROUPS: usize = 12;

#[derive(Clone, Copy)]
struct Window {
    groups: [Group; MAX_GROUPS],
    len: u8,
}

/// `WINDOWS[w]` assembles the 16-bit code of core `w`.
const WINDOWS: [Window; 16] = build_windows();

const fn build_windows() -> [Window; 16] {
    let empty = Group { word: 0, mask: 0, shift: 0 };
    let mut windows = [Window { groups: [empty; MAX_GROUPS], len: 0 }; 16];
    let mut w = 0;
    while w < 16 {
        let (ox, oy) = core_origin(w);
        let mut k = 0;
        while k < 16 {
            let (dx, dy) = CODE_OFFSETS[k];
            let x = ox + dx;
            let y = oy + dy;
            let sx = x.div_euclid(BLOCK_SIZE_I32) + 1;
            let sy = y.div_euclid(BLOCK_SIZE_I32) + 1;
            let lx = x.rem_euclid(BLOCK_SIZE_I32) as usize;
            let ly = y.rem_euclid(BLOCK_SIZE_I32) as usize;
            let word = (sy * 3 + sx) as u8;
            let bit = SHIFT[lx + ly * BLOCK_SIZE];
            let shift = k as i8 - bit as i8;

            let window = &mut windows[w];
            let mut g = 0;
            while g < window.len as usize {
                if window.groups[g].word == word && window.groups[g].shift == shift {
                    break;
                }
                g += 1;
            }
            if g == window.len as usize {
                assert!(g < MAX_GROUPS, "window needs more groups than MAX_GROUPS");
                window.groups[g] = Group { word, mask: 0, shift };
                window.len += 1;
            }
            window.groups[g].mask |= 1 << bit;
            k += 1;
        }
        w += 1;
    }
    windows
}

/// Local cell of the top-left corner of core `w` (bits `4w..4w+3`).
const fn core_origin(w: usize) -> (i32, i32) {
    let quadrant = w / 4;
    let sub = w % 4;
    let x = (quadrant % 2) * 4 + (sub % 2) * 2;
    let y = (quadrant / 2) * 4 + (sub / 2) * 2;
    (x as i32, y as i32)
}

#[inline(always)]
fn window_code(words: &Neighborhood, window: &Window) -> u16 {
    let mut code = 0u64;
    for group in &window.groups[..window.len as usize] {
        let bits = words[group.word as usize] & group.mask;
        code |= if group.shift >= 0 {
            bits << group.shift
        } else {
            bits >> -group.shift
        };
    }
    code as u16
}

/// Next state of `words[CENTER]`.
#[inline]
pub fn advance_block(words: &Neighborhood, table: &TransitionTable) -> u64 {
    let mut next = 0u64;
    for (w, window) in WINDOWS.iter().enumerate() {
        let core = table.lookup(window_code(words, window)) & 0xF;
        next |= (core as u64) << (4 * w);
    }
    next
}
