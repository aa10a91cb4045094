use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub course: String,
    /// Chapter number; missing or zero means uncategorized
    #[serde(default)]
    pub chapter: Option<u32>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
}

impl Note {
    /// The chapter this note is filed under, if any
    pub fn chapter_key(&self) -> Option<u32> {
        self.chapter.filter(|c| *c != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewNote {
    pub title: String,
    pub course: String,
    pub chapter: u32,
    pub text: String,
}

/// Fields a note edit may change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NoteUpdate {
    pub title: String,
    pub chapter: u32,
    pub text: String,
}

/// Group notes by chapter in ascending chapter order, uncategorized last.
pub fn group_by_chapter(notes: &[Note]) -> Vec<(Option<u32>, Vec<&Note>)> {
    let mut groups: Vec<(Option<u32>, Vec<&Note>)> = Vec::new();
    for note in notes {
        let key = note.chapter_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(note),
            None => groups.push((key, vec![note])),
        }
    }
    groups.sort_by_key(|(key, _)| (key.is_none(), *key));
    groups
}
