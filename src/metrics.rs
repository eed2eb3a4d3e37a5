//! Pure metric functions shared by the live display and final results.

/// Gross words per minute, using the standard convention that five typed
/// characters count as one word. Zero until a full second has elapsed.
pub fn wpm(total_chars: usize, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 0;
    }
    let minutes = elapsed_secs as f64 / 60.0;
    ((total_chars as f64 / 5.0) / minutes).round() as u32
}

/// Accuracy of the current prefix as a whole percentage. A session with no
/// input yet reads 100, not 0: the display starts from perfect.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    ((correct_chars as f64 / total_chars as f64) * 100.0).round() as u32
}
