/*!
 * Cross-track alignment.
 *
 * Native (translation) subtitles rarely share cue boundaries with the
 * foreign track, so lines are matched by time overlap instead of by index.
 */

use crate::subtitle_processor::Cue;

/// Collect the lines of every native cue overlapping the foreign cue
///
/// `native` must be sorted by start time: the scan stops at the first cue
/// starting at or after the foreign cue's end. A native cue that starts
/// slightly earlier is still included as long as it ends after the foreign
/// cue starts. The returned cue reuses the foreign cue's window; only its
/// lines are meaningful.
pub fn align(foreign: &Cue, native: &[Cue]) -> Cue {
    let lines = native
        .iter()
        .take_while(|cue| cue.start_ms < foreign.end_ms)
        .filter(|cue| overlaps(foreign, cue))
        .flat_map(|cue| cue.lines.iter().cloned())
        .collect();

    Cue {
        start_ms: foreign.start_ms,
        end_ms: foreign.end_ms,
        lines,
    }
}

fn overlaps(foreign: &Cue, native: &Cue) -> bool {
    native.start_ms < foreign.end_ms
        && (native.start_ms >= foreign.start_ms || native.end_ms > foreign.start_ms)
}
