/*!
 * Cue normalization.
 *
 * Some subtitle sources reveal captions progressively: each new cue repeats
 * the trailing lines of the previous one and appends a few more, or an empty
 * cue is emitted as a bare timing placeholder before the text arrives. This
 * module collapses such fragments into clean cues in a single pass.
 */

use log::debug;

use crate::subtitle_processor::Cue;

/// Collapse redundant and overlapping cue fragments
///
/// Input must be sorted by start time. The result never has more cues than
/// the input, and no retained cue starts with lines its predecessor ends with,
/// including text that arrives through a placeholder.
pub fn normalize(cues: Vec<Cue>) -> Vec<Cue> {
    let input_len = cues.len();

    let retained = cues.into_iter().fold(Vec::with_capacity(input_len), |mut retained: Vec<Cue>, mut next| {
        let unabsorbed = match retained.as_mut_slice() {
            [.., before, last] if last.lines.is_empty() => {
                remove_overlap(before, &mut next);
                fill_placeholder(last, next);
                None
            }
            [.., last] if last.lines.is_empty() => {
                fill_placeholder(last, next);
                None
            }
            [.., last] if !next.lines.is_empty() => {
                remove_overlap(last, &mut next);
                if next.lines.is_empty() {
                    last.end_ms = next.end_ms;
                    None
                } else {
                    Some(next)
                }
            }
            _ => Some(next),
        };

        if let Some(next) = unabsorbed {
            retained.push(next);
        }
        retained
    });

    if retained.len() < input_len {
        debug!("Normalized {} cues into {}", input_len, retained.len());
    }

    retained
}

// The next cue's text belongs to the placeholder before it
fn fill_placeholder(placeholder: &mut Cue, mut next: Cue) {
    placeholder.lines.append(&mut next.lines);
    placeholder.end_ms = next.end_ms;
}

/// Drop the leading lines of `next` that repeat the trailing lines of `prev`
///
/// Looks for the longest suffix of `prev` that equals a prefix of `next`,
/// trying the largest candidate length first. Interior repetition is not
/// detected.
pub fn remove_overlap(prev: &Cue, next: &mut Cue) {
    let max = prev.lines.len().min(next.lines.len());

    let overlap = (1..=max)
        .rev()
        .find(|&n| prev.lines[prev.lines.len() - n..] == next.lines[..n]);

    if let Some(n) = overlap {
        next.lines.drain(..n);
    }
}
