use std::fmt::{Display, Formatter, Write as _};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use folio::text_utils::slugify;

#[derive(Parser, Debug)]
#[command(version, about = "Creates a new draft blog post", long_about = None)]
struct Args {
    #[arg(short, long)]
    title: String,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    author: Option<String>,

    #[arg(short, long)]
    category: Option<String>,

    /// Comma separated, e.g. `rust,web`
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    #[arg(short, long, default_value_t = PostOutput::Stdout)]
    output: PostOutput,

    /// Directory the post file is created in
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Clone, Debug, ValueEnum)]
enum PostOutput {
    Stdout,
    File,
}

impl Display for PostOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PostOutput::Stdout => write!(f, "stdout"),
            PostOutput::File => write!(f, "file"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPostHeader<'a> {
    title: &'a str,
    date: String,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    tags: &'a [String],
    author: &'a str,
    pinned: bool,
    published: bool,
}

fn get_author(args: &Args) -> String {
    if let Some(ref author) = args.author {
        return author.clone();
    }

    let name = whoami::realname();
    if name.is_empty() {
        return whoami::username();
    }
    name
}

fn render_post(title: &str, author: &str, category: Option<&str>, tags: &[String], date: NaiveDate) -> Result<String> {
    let tags: Vec<String> = tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
    let header = NewPostHeader {
        title,
        date: date.format("%Y-%m-%d").to_string(),
        description: "Replace with a one line summary",
        category,
        tags: &tags,
        author,
        pinned: false,
        published: false,
    };
    let yaml = serde_yaml::to_string(&header).context("Error writing post header")?;

    let mut buf = String::new();
    let _ = writeln!(&mut buf, "---");
    let _ = write!(&mut buf, "{}", yaml);
    let _ = writeln!(&mut buf, "---");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    Ok(buf)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let slug = slugify(&args.title);
    if slug.is_empty() {
        bail!("The title {:?} has no characters usable in a file name", args.title);
    }

    let author = get_author(&args);
    let today = Local::now().date_naive();
    let post = render_post(&args.title, &author, args.category.as_deref(), &args.tags, today)?;

    match args.output {
        PostOutput::Stdout => print!("{}", post),
        PostOutput::File => {
            let path = args.dir.join(format!("{}.md", slug));
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .with_context(|| format!("Error creating {}", path.display()))?;
            file.write_all(post.as_bytes())?;
            println!("Created {}", path.display());
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use folio::content::post_parser::parse_blog_post;

    use super::*;

    #[test]
    fn test_rendered_post_is_a_draft() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let tags = vec!["rust".to_string(), " web ".to_string(), "".to_string()];
        let raw = render_post("Ownership: a field guide", "Jane Doe", Some("Rust"), &tags, date).unwrap();
        assert!(raw.starts_with("---\ntitle: "));

        let post = parse_blog_post(&raw, "ownership-a-field-guide").unwrap();
        assert_eq!(post.metadata.title, "Ownership: a field guide");
        assert_eq!(post.metadata.date, "2024-02-29");
        assert_eq!(post.metadata.category.as_deref(), Some("Rust"));
        assert_eq!(post.metadata.tags, ["rust", "web"]);
        assert_eq!(post.metadata.author.as_deref(), Some("Jane Doe"));
        assert!(!post.metadata.published);
        assert!(!post.metadata.pinned);
        assert!(post.content.contains("This is a body example"));
    }

    #[test]
    fn test_category_is_optional() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let raw = render_post("Hello", "me", None, &[], date).unwrap();
        assert!(!raw.contains("category"));
        assert!(raw.contains("tags: []"));
    }

    #[test]
    fn test_file_name_from_title() {
        assert_eq!(slugify("Café society: notes"), "cafe-society-notes");
    }
}
