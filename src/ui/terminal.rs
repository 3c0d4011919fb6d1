use std::path::{Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::error::Result;
use crate::types::Secret;
use crate::ui::{Dialog, MenuItem};

/// Prompts on the controlling terminal. Esc or `q` backs out of menus and questions.
pub struct TerminalDialog {
    theme: ColorfulTheme,
    title: String,
}

impl TerminalDialog {
    pub fn new(title: impl Into<String>) -> Self {
        TerminalDialog {
            theme: ColorfulTheme::default(),
            title: title.into(),
        }
    }

    fn label(item: &MenuItem, width: usize) -> String {
        format!("{:<width$}  {}", item.tag, item.description, width = width)
    }
}

impl Dialog for TerminalDialog {
    fn menu(&mut self, prompt: &str, items: &[MenuItem]) -> Result<Option<String>> {
        let width = items.iter().map(|item| item.tag.len()).max().unwrap_or(0);
        let labels: Vec<String> = items.iter().map(|item| Self::label(item, width)).collect();
        let picked = Select::with_theme(&self.theme)
            .with_prompt(format!("{} - {}", self.title, prompt))
            .items(&labels)
            .default(0)
            .interact_opt()?;
        Ok(picked.and_then(|idx| items.get(idx)).map(|item| item.tag.clone()))
    }

    fn yes_no(&mut self, prompt: &str) -> Result<Option<bool>> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact_opt()?;
        Ok(answer)
    }

    fn password(&mut self, prompt: &str, confirm: bool) -> Result<Option<Secret>> {
        let mut input = Password::with_theme(&self.theme);
        input = input.with_prompt(prompt).allow_empty_password(true);
        if confirm {
            input = input.with_confirmation("Confirm password", "Passwords do not match");
        }
        Ok(Secret::new(input.interact()?))
    }

    fn path(&mut self, prompt: &str, initial: &Path) -> Result<Option<PathBuf>> {
        Ok(self
            .text(prompt, &initial.display().to_string())?
            .map(PathBuf::from))
    }

    fn text(&mut self, prompt: &str, initial: &str) -> Result<Option<String>> {
        let text: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text.to_string()))
    }

    fn message(&mut self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_align_tags() {
        let item = MenuItem::new("sda", "20G | ModelX");
        assert_eq!(TerminalDialog::label(&item, 7), "sda      20G | ModelX");
    }
}
