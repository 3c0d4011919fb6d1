pub mod terminal;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Secret;

pub use terminal::TerminalDialog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub tag: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(tag: impl Into<String>, description: impl Into<String>) -> Self {
        MenuItem {
            tag: tag.into(),
            description: description.into(),
        }
    }
}

/// Modal prompts. `Ok(None)` means the user backed out.
pub trait Dialog {
    /// Returns the tag of the chosen item.
    fn menu(&mut self, prompt: &str, items: &[MenuItem]) -> Result<Option<String>>;
    fn yes_no(&mut self, prompt: &str) -> Result<Option<bool>>;
    /// Empty input counts as backing out.
    fn password(&mut self, prompt: &str, confirm: bool) -> Result<Option<Secret>>;
    fn path(&mut self, prompt: &str, initial: &Path) -> Result<Option<PathBuf>>;
    /// Free text; empty input counts as backing out.
    fn text(&mut self, prompt: &str, initial: &str) -> Result<Option<String>>;
    fn message(&mut self, text: &str) -> Result<()>;
}

#[cfg(test)]
pub mod scripted {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    use super::{Dialog, MenuItem};
    use crate::error::Result;
    use crate::types::Secret;

    #[derive(Debug, Clone)]
    pub enum Reply {
        Choose(&'static str),
        Answer(bool),
        Password(&'static str),
        Path(PathBuf),
        Text(&'static str),
        Cancel,
    }

    /// Plays back canned replies in order and records everything shown.
    #[derive(Debug, Default)]
    pub struct ScriptedDialog {
        replies: VecDeque<Reply>,
        pub prompts: Vec<String>,
        pub menus: Vec<Vec<MenuItem>>,
        pub messages: Vec<String>,
    }

    impl ScriptedDialog {
        pub fn new(replies: Vec<Reply>) -> Self {
            ScriptedDialog {
                replies: replies.into(),
                ..Default::default()
            }
        }

        pub fn exhausted(&self) -> bool {
            self.replies.is_empty()
        }

        fn next(&mut self, prompt: &str) -> Reply {
            self.prompts.push(prompt.to_string());
            self.replies
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted reply for {:?}", prompt))
        }
    }

    impl Dialog for ScriptedDialog {
        fn menu(&mut self, prompt: &str, items: &[MenuItem]) -> Result<Option<String>> {
            self.menus.push(items.to_vec());
            match self.next(prompt) {
                Reply::Choose(tag) => {
                    assert!(
                        items.iter().any(|item| item.tag == tag),
                        "{} not offered for {:?}",
                        tag,
                        prompt
                    );
                    Ok(Some(tag.to_string()))
                }
                Reply::Cancel => Ok(None),
                other => panic!("menu {:?} got {:?}", prompt, other),
            }
        }

        fn yes_no(&mut self, prompt: &str) -> Result<Option<bool>> {
            match self.next(prompt) {
                Reply::Answer(value) => Ok(Some(value)),
                Reply::Cancel => Ok(None),
                other => panic!("yes/no {:?} got {:?}", prompt, other),
            }
        }

        fn password(&mut self, prompt: &str, _confirm: bool) -> Result<Option<Secret>> {
            match self.next(prompt) {
                Reply::Password(value) => Ok(Secret::new(value)),
                Reply::Cancel => Ok(None),
                other => panic!("password {:?} got {:?}", prompt, other),
            }
        }

        fn path(&mut self, prompt: &str, _initial: &Path) -> Result<Option<PathBuf>> {
            match self.next(prompt) {
                Reply::Path(path) => Ok(Some(path)),
                Reply::Cancel => Ok(None),
                other => panic!("path {:?} got {:?}", prompt, other),
            }
        }

        fn text(&mut self, prompt: &str, _initial: &str) -> Result<Option<String>> {
            match self.next(prompt) {
                Reply::Text(value) => Ok(Some(value.to_string())),
                Reply::Cancel => Ok(None),
                other => panic!("text {:?} got {:?}", prompt, other),
            }
        }

        fn message(&mut self, text: &str) -> Result<()> {
            self.messages.push(text.to_string());
            Ok(())
        }
    }
}
