use std::collections::BTreeSet;
use std::path::PathBuf;

/// Tracked files modified in place relative to the last commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: BTreeSet<PathBuf>,
}

impl ChangeSet {
    /// Build a change set from `git status --porcelain` output.
    ///
    /// Only entries whose status is modified-in-place (`M` in either the
    /// index or the worktree column) are kept. Additions, deletions,
    /// renames, copies, conflicts and untracked files are ignored.
    pub fn from_porcelain(output: &str) -> Self {
        let files = output
            .lines()
            .filter_map(parse_porcelain_line)
            .collect();
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = PathBuf;
    type IntoIter = std::collections::btree_set::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<PathBuf> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

fn parse_porcelain_line(line: &str) -> Option<PathBuf> {
    let mut chars = line.chars();
    let index = chars.next()?;
    let worktree = chars.next()?;
    let path = line.get(3..)?.trim();

    let modified = matches!((index, worktree), ('M', 'M' | ' ') | (' ', 'M'));
    if !modified || path.is_empty() {
        return None;
    }

    Some(unquote_path(path))
}

/// Undo git's C-style quoting of unusual paths (`core.quotePath`).
///
/// Quoted paths carry escapes (`\t`, `\"`, `\\`) and octal bytes such as
/// `\303\251`. Decoded bytes that are not UTF-8 are replaced lossily.
fn unquote_path(path: &str) -> PathBuf {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return PathBuf::from(path);
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        rest = tail;
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let Some((&escape, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match escape {
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b't' => bytes.push(b'\t'),
            b'n' => bytes.push(b'\n'),
            b'v' => bytes.push(0x0b),
            b'f' => bytes.push(0x0c),
            b'r' => bytes.push(b'\r'),
            b'0'..=b'3' if rest.len() >= 2 && rest[..2].iter().all(|b| (b'0'..=b'7').contains(b)) => {
                bytes.push(((escape - b'0') << 6) | ((rest[0] - b'0') << 3) | (rest[1] - b'0'));
                rest = &rest[2..];
            }
            other => bytes.push(other),
        }
    }

    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}
