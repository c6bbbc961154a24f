use std::collections::HashSet;

/// Line-uniqueness tally across a set of files.
///
/// Lines are compared after trimming surrounding whitespace, so the same
/// statement at different indentation counts as a repeat. Blank lines all
/// collapse to one unique entry.
#[derive(Debug, Default, Clone)]
pub struct LineUniqueness {
    total_lines: usize,
    unique: HashSet<String>,
}

impl LineUniqueness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, text: &str) {
        for line in text.lines() {
            self.total_lines += 1;
            self.unique.insert(line.trim().to_string());
        }
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn unique_lines(&self) -> usize {
        self.unique.len()
    }

    /// `100 * (1 - unique / total)`, or `None` when no lines were seen
    pub fn duplication_pct(&self) -> Option<f64> {
        if self.total_lines == 0 {
            return None;
        }
        let ratio = self.unique.len() as f64 / self.total_lines as f64;
        Some(((1.0 - ratio) * 100.0).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lines_is_unknown() {
        let stats = LineUniqueness::new();
        assert_eq!(stats.duplication_pct(), None);
    }

    #[test]
    fn test_unique_lines_have_no_duplication() {
        let mut stats = LineUniqueness::new();
        stats.add_source("a = 1\nb = 2\nc = 3\n");
        assert_eq!(stats.duplication_pct(), Some(0.0));
    }

    #[test]
    fn test_indentation_ignored() {
        let mut stats = LineUniqueness::new();
        stats.add_source("x += 1\n    x += 1\n");
        assert_eq!(stats.unique_lines(), 1);
        assert_eq!(stats.duplication_pct(), Some(50.0));
    }

    #[test]
    fn test_repeats_across_files() {
        let mut stats = LineUniqueness::new();
        stats.add_source("import os\nrun()\n");
        stats.add_source("import os\nstop()\n");
        assert_eq!(stats.total_lines(), 4);
        assert_eq!(stats.unique_lines(), 3);
        assert_eq!(stats.duplication_pct(), Some(25.0));
    }
}
