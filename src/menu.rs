use clap::ValueEnum;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::editor::{find_docs_heading, fix_docs, fix_generic, FixOutcome};
use crate::error::Result;
use crate::scanner::MarkdownDocument;

/// How isolated files get linked from the root README
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// New "Other Documentation" section at the end
    Generic,
    /// Existing section whose heading mentions docs
    Docs,
    /// Leave the README alone
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AwaitingPrimaryChoice,
    /// Docs was picked but no docs heading exists
    AwaitingFallbackChoice,
    Resolved(Strategy),
}

const PRIMARY_CHOICES: &[char] = &['G', 'D', 'M'];
const FALLBACK_CHOICES: &[char] = &['G', 'M'];

/// Input that is not one of `allowed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChoice {
    pub allowed: &'static [char],
}

impl InvalidChoice {
    pub fn message(&self) -> String {
        let mut sorted = self.allowed.to_vec();
        sorted.sort_unstable();
        let options: Vec<String> = sorted.iter().map(|c| c.to_string()).collect();
        format!("Invalid — please enter {}.", options.join(" or "))
    }
}

/// The fix prompt as a pure state machine; terminal I/O lives in [`prompt_fix_menu`]
#[derive(Debug)]
pub struct FixMenu {
    state: MenuState,
    has_docs_section: bool,
}

impl FixMenu {
    pub fn new(has_docs_section: bool) -> Self {
        Self {
            state: MenuState::AwaitingPrimaryChoice,
            has_docs_section,
        }
    }

    pub fn allowed(&self) -> &'static [char] {
        match self.state {
            MenuState::AwaitingPrimaryChoice => PRIMARY_CHOICES,
            MenuState::AwaitingFallbackChoice => FALLBACK_CHOICES,
            MenuState::Resolved(_) => &[],
        }
    }

    /// Feed one line of input. Case and surrounding whitespace are ignored.
    pub fn step(&mut self, input: &str) -> std::result::Result<MenuState, InvalidChoice> {
        let allowed = self.allowed();
        let choice = single_char(input)
            .filter(|c| allowed.contains(c))
            .ok_or(InvalidChoice { allowed })?;

        self.state = match (self.state, choice) {
            (MenuState::AwaitingPrimaryChoice, 'D') if !self.has_docs_section => {
                MenuState::AwaitingFallbackChoice
            }
            (_, 'G') => MenuState::Resolved(Strategy::Generic),
            (_, 'D') => MenuState::Resolved(Strategy::Docs),
            _ => MenuState::Resolved(Strategy::Manual),
        };
        Ok(self.state)
    }
}

fn single_char(input: &str) -> Option<char> {
    let mut chars = input.trim().chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c.to_ascii_uppercase())
}

/// Applies `strategy` without asking. Docs falls back to generic when the README has no
/// docs section. `None` means the README was left untouched on purpose.
pub fn apply_strategy(
    strategy: Strategy,
    readme: &Path,
    isolated: &[&MarkdownDocument],
) -> Result<Option<FixOutcome>> {
    match strategy {
        Strategy::Manual => Ok(None),
        Strategy::Generic => fix_generic(readme, isolated).map(Some),
        Strategy::Docs => {
            let outcome = fix_docs(readme, isolated)?;
            if outcome.section.is_empty() {
                tracing::warn!(readme = %readme.display(), "no docs section found, using generic section");
                fix_generic(readme, isolated).map(Some)
            } else {
                Ok(Some(outcome))
            }
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    menu: &mut FixMenu,
    label: &str,
    input: &mut R,
    out: &mut W,
) -> Result<MenuState> {
    loop {
        write!(out, "{}", label.cyan().bold())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // closed input: nothing to decide with
            return Ok(MenuState::Resolved(Strategy::Manual));
        }

        match menu.step(&line) {
            Ok(state) => return Ok(state),
            Err(invalid) => writeln!(out, "  {}", format!("✗ {}", invalid.message()).red())?,
        }
    }
}

/// Interactive G/D/M menu over the given input and output
pub fn prompt_fix_menu<R: BufRead, W: Write>(
    readme: &Path,
    isolated: &[&MarkdownDocument],
    input: &mut R,
    out: &mut W,
) -> Result<Option<FixOutcome>> {
    let content = std::fs::read_to_string(readme)?;
    let docs_section = find_docs_heading(&content);
    let readme_name = readme
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    writeln!(out)?;
    writeln!(out, "{}", "🔧  Fix isolated files?".white().bold())?;
    writeln!(
        out,
        "{}",
        format!("{} file(s) are not linked in {}", isolated.len(), readme_name).dimmed()
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}  {:<8} {}",
        "[G]".magenta().bold(),
        "Generic",
        "Append a new \"📎 Other Documentation\" section at the end of the README".dimmed()
    )?;
    let docs_hint = match &docs_section {
        Some(title) => format!("found: \"{}\" — missing links go there", title).green(),
        None => "no docs heading found — you will be asked what to do next".yellow(),
    };
    writeln!(out, "  {}  {:<8} {}", "[D]".magenta().bold(), "Docs", docs_hint)?;
    writeln!(
        out,
        "  {}  {:<8} {}",
        "[M]".magenta().bold(),
        "Manual",
        "I'll update the README myself — no changes made".dimmed()
    )?;
    writeln!(out)?;

    let mut menu = FixMenu::new(docs_section.is_some());
    let mut state = prompt(&mut menu, "  Enter choice (G / D / M): ", input, out)?;

    if state == MenuState::AwaitingFallbackChoice {
        writeln!(
            out,
            "{}",
            "  ⚠️  No heading matching \"docs\" or \"documentation\" was found in the README.".yellow()
        )?;
        writeln!(out, "  {}  {:<8} {}", "[G]".magenta().bold(), "Generic", "Create a new \"📎 Other Documentation\" section instead".dimmed())?;
        writeln!(out, "  {}  {:<8} {}", "[M]".magenta().bold(), "Manual", "Cancel — I'll add or rename a section myself".dimmed())?;
        state = prompt(&mut menu, "  Enter choice (G / M): ", input, out)?;
    }
    writeln!(out)?;

    let strategy = match state {
        MenuState::Resolved(strategy) => strategy,
        _ => Strategy::Manual,
    };

    let outcome = apply_strategy(strategy, readme, isolated)?;
    match &outcome {
        None => writeln!(out, "{}", "  Manual mode — no changes made.".dimmed())?,
        Some(o) if o.added > 0 => writeln!(
            out,
            "  {} Added {} link(s) under \"{}\" in {}",
            "✅ Done!".green().bold(),
            o.added.to_string().bold(),
            o.section.cyan(),
            readme_name.bold()
        )?,
        Some(_) => writeln!(
            out,
            "{}",
            "  ⚠️  No new links added — all isolated files are already present.".yellow()
        )?,
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn doc(dir: &Path, name: &str, title: &str) -> MarkdownDocument {
        let path = dir.join(name);
        fs::write(&path, format!("# {}\n", title)).unwrap();
        MarkdownDocument {
            path,
            title: title.to_string(),
            description: String::new(),
            word_count: 0,
            sections: vec![],
            is_readme: false,
            is_root_readme: false,
        }
    }

    #[test]
    fn test_primary_choices_resolve() {
        for (input, expected) in [("g", Strategy::Generic), (" M \n", Strategy::Manual), ("D", Strategy::Docs)] {
            let mut menu = FixMenu::new(true);
            assert_eq!(menu.step(input), Ok(MenuState::Resolved(expected)));
        }
    }

    #[test]
    fn test_invalid_input_keeps_state() {
        let mut menu = FixMenu::new(true);
        for input in ["x", "", "gd", "Generic"] {
            let err = menu.step(input).unwrap_err();
            assert_eq!(err.allowed, PRIMARY_CHOICES);
            assert_eq!(menu.allowed(), PRIMARY_CHOICES);
        }
        assert_eq!(
            InvalidChoice { allowed: FALLBACK_CHOICES }.message(),
            "Invalid — please enter G or M."
        );
    }

    #[test]
    fn test_docs_without_section_asks_for_fallback() {
        let mut menu = FixMenu::new(false);
        assert_eq!(menu.step("d"), Ok(MenuState::AwaitingFallbackChoice));
        assert_eq!(menu.allowed(), FALLBACK_CHOICES);
        assert!(menu.step("d").is_err());
        assert_eq!(menu.step("g"), Ok(MenuState::Resolved(Strategy::Generic)));
    }

    #[test]
    fn test_fallback_manual() {
        let mut menu = FixMenu::new(false);
        menu.step("D").unwrap();
        assert_eq!(menu.step("m"), Ok(MenuState::Resolved(Strategy::Manual)));
        assert!(menu.allowed().is_empty());
    }

    #[test]
    fn test_prompt_retries_then_applies_docs() {
        let dir = tempdir().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "# P\n\n## Documentation\n\nIntro.\n").unwrap();
        let guide = doc(dir.path(), "guide.md", "Guide");

        let mut input = Cursor::new("z\nd\n");
        let mut out = Vec::new();
        let outcome = prompt_fix_menu(&readme, &[&guide], &mut input, &mut out).unwrap();

        assert_eq!(outcome.unwrap().section, "Documentation");
        assert!(String::from_utf8_lossy(&out).contains("please enter D or G or M"));
        assert!(fs::read_to_string(&readme).unwrap().contains("Intro.\n- [Guide](guide.md)\n"));
    }

    #[test]
    fn test_prompt_fallback_to_generic() {
        let dir = tempdir().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "# P\n").unwrap();
        let guide = doc(dir.path(), "guide.md", "Guide");

        let mut input = Cursor::new("d\ng\n");
        let mut out = Vec::new();
        let outcome = prompt_fix_menu(&readme, &[&guide], &mut input, &mut out).unwrap();

        assert_eq!(outcome.unwrap().added, 1);
        assert!(fs::read_to_string(&readme).unwrap().contains("## 📎 Other Documentation"));
    }

    #[test]
    fn test_prompt_eof_is_manual() {
        let dir = tempdir().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "# P\n").unwrap();
        let guide = doc(dir.path(), "guide.md", "Guide");

        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let outcome = prompt_fix_menu(&readme, &[&guide], &mut input, &mut out).unwrap();

        assert!(outcome.is_none());
        assert_eq!(fs::read_to_string(&readme).unwrap(), "# P\n");
    }

    #[test]
    fn test_apply_docs_strategy_falls_back() {
        let dir = tempdir().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "# P\n\n## Docker Setup\n").unwrap();
        let guide = doc(dir.path(), "guide.md", "Guide");

        let outcome = apply_strategy(Strategy::Docs, &readme, &[&guide]).unwrap().unwrap();
        assert_eq!(outcome.section, "📎 Other Documentation");
        assert_eq!(outcome.added, 1);
    }
}
