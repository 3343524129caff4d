use colored::Colorize;

use crate::classify::Summary;

/// First `max` chars, with an ellipsis when something was cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    }
}

fn sections_preview(sections: &[String]) -> String {
    if sections.is_empty() {
        return "—".to_string();
    }
    let mut preview = sections.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if sections.len() > 3 {
        preview.push('…');
    }
    preview
}

pub fn print_dashboard(summary: &Summary) {
    println!();
    println!("{}", "📋 MD Files Connector".cyan().bold());
    println!("  {}", format!("Project root: {}", summary.root.display()).dimmed());
    println!();

    let readme = match summary.readme_display() {
        Some(path) => path.normal(),
        None => "NOT FOUND".red(),
    };
    let isolated_count = if summary.isolated.is_empty() {
        "0".green()
    } else {
        summary.isolated.len().to_string().yellow()
    };

    println!("  📄 Root README:                          {}", readme);
    println!("  📁 Total MD files (excl. root README):   {}", summary.total.to_string().cyan());
    println!("  ✅ Linked in root README:                {}", summary.linked.len().to_string().green());
    println!("  ⚠️  Isolated (not in root README):        {}", isolated_count);
    println!("  📊 README coverage:                      {}", format!("{:.1}%", summary.coverage).bold());
    println!();

    if !summary.linked.is_empty() {
        println!("{}", "✅ Linked Files".green().bold());
        println!(
            "  {:>4}  {:<32} {:<36} {:>7}  {}",
            "#".dimmed(),
            "File",
            "Title",
            "Words",
            "Sections"
        );
        for (i, doc) in summary.linked.iter().enumerate() {
            println!(
                "  {:>4}  {:<32} {:<36} {:>7}  {}",
                (i + 1).to_string().dimmed(),
                summary.display_path(&doc.path).green(),
                truncate(&doc.title, 35),
                doc.word_count.to_string().dimmed(),
                sections_preview(&doc.sections).dimmed()
            );
        }
        println!();
    }

    if summary.isolated.is_empty() {
        println!("{}", "🎉 All MD files are linked in the root README!".green().bold());
        println!();
        return;
    }

    println!("{}", "⚠️  Isolated Files — not in root README".yellow().bold());
    println!(
        "  {:>4}  {:<32} {:<36} {:>7}  {}",
        "#".dimmed(),
        "File",
        "Title",
        "Words",
        "First line / description"
    );
    for (i, doc) in summary.isolated.iter().enumerate() {
        let description = if doc.description.is_empty() {
            "—".to_string()
        } else {
            truncate(&doc.description, 55)
        };
        println!(
            "  {:>4}  {:<32} {:<36} {:>7}  {}",
            (i + 1).to_string().dimmed(),
            summary.display_path(&doc.path).yellow(),
            truncate(&doc.title, 35),
            doc.word_count.to_string().dimmed(),
            description.dimmed()
        );
    }
    println!();
    println!("{}", "💡 Add these to your root README.md to improve discoverability.".yellow());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 35), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("ééééé", 4), "éééé…");
    }

    #[test]
    fn test_sections_preview() {
        assert_eq!(sections_preview(&[]), "—");
        let sections: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sections_preview(&sections[..3]), "A, B, C");
        assert_eq!(sections_preview(&sections), "A, B, C…");
    }
}
