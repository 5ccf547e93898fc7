use anyhow::{Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

/// A bundled NanoLang example program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub slug: &'static str,
    pub title: &'static str,
    pub source: &'static str,
}

pub const EXAMPLES: &[Example] = &[
    Example {
        slug: "hello",
        title: "Hello World",
        source: "note Welcome to NanoLang!\nsay \"Hello World!\"\nsay \"Coding is fun.\"\n",
    },
    Example {
        slug: "variables",
        title: "Variables & Math",
        source: "set x = 10\nset y = 5\nsay \"X is \" + x\nsay \"Y is \" + y\nset result = x * y\nsay \"Multiplication result: \" + result\n",
    },
    Example {
        slug: "loops",
        title: "Loops",
        source: "say \"Counting down...\"\nrepeat 5\n  say \"Loop iteration\"\nend\nsay \"Done!\"\n",
    },
    Example {
        slug: "logic",
        title: "Logic",
        source: "set power = 9001\ncheck power > 9000\n  say \"It is over 9000!\"\nend\n",
    },
];

pub fn find_example(slug: &str) -> Option<&'static Example> {
    EXAMPLES.iter().find(|example| example.slug == slug)
}

pub fn example_slugs() -> Vec<&'static str> {
    EXAMPLES.iter().map(|example| example.slug).collect()
}

/// Write the example `slug` to `path`, prefixed with a `note` naming the
/// program. Refuses to overwrite an existing file.
pub fn write_example(slug: &str, program_name: &str, path: &Path) -> Result<PathBuf> {
    let example = find_example(slug).ok_or_else(|| {
        anyhow!(
            "Unknown template '{}', expected one of: {}",
            slug,
            example_slugs().join(", ")
        )
    })?;

    if path.exists() {
        return Err(anyhow!("Refusing to overwrite {}", path.display()));
    }

    let content = format!("note {} ({})\n{}", program_name, example.title, example.source);
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Default file name for a new program: lower-cased with a `.nano` suffix.
pub fn default_file_name(program_name: &str) -> PathBuf {
    PathBuf::from(format!("{}.nano", program_name.to_lowercase()))
}
