// Language inference from file paths

use std::path::Path;

/// Map a file path to a language tag.
///
/// Extension lookup first, falling back to special-cased basenames for
/// extensionless build files. Returns `None` for files we have no
/// pattern tables for; the scanner still records them so duplicate and
/// text-reference queries can see their content.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if let Some(lang) = language_for_extension(&ext.to_ascii_lowercase()) {
            return Some(lang);
        }
    }

    let name = path.file_name()?.to_str()?;
    match name {
        "Dockerfile" | "Containerfile" => Some("dockerfile"),
        "Makefile" | "makefile" | "GNUmakefile" => Some("makefile"),
        "Rakefile" | "Gemfile" => Some("ruby"),
        "CMakeLists.txt" => Some("cmake"),
        "Vagrantfile" => Some("ruby"),
        "Jenkinsfile" => Some("groovy"),
        _ => None,
    }
}

fn language_for_extension(ext: &str) -> Option<&'static str> {
    let lang = match ext {
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescript",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascript",
        "py" | "pyi" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "scala" => "scala",
        "lua" => "lua",
        "ex" | "exs" => "elixir",
        "hs" => "haskell",
        "sh" | "bash" | "zsh" => "shell",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" | "sass" => "scss",
        "vue" => "vue",
        "svelte" => "svelte",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "json" => "json",
        "md" | "markdown" => "markdown",
        _ => return None,
    };
    Some(lang)
}

/// Languages whose block structure is brace-delimited. The pattern
/// extractor uses brace matching for these and indentation decrease for
/// everything else.
pub fn is_brace_language(lang: &str) -> bool {
    matches!(
        lang,
        "typescript"
            | "javascript"
            | "rust"
            | "go"
            | "java"
            | "kotlin"
            | "c"
            | "cpp"
            | "csharp"
            | "php"
            | "swift"
            | "scala"
            | "css"
            | "scss"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(language_for_path(Path::new("src/main.rs")), Some("rust"));
        assert_eq!(language_for_path(Path::new("app.TS")), Some("typescript"));
        assert_eq!(language_for_path(Path::new("lib/util.py")), Some("python"));
        assert_eq!(language_for_path(Path::new("x.unknownext")), None);
    }

    #[test]
    fn test_special_basenames() {
        assert_eq!(
            language_for_path(Path::new("docker/Dockerfile")),
            Some("dockerfile")
        );
        assert_eq!(language_for_path(Path::new("Makefile")), Some("makefile"));
        assert_eq!(language_for_path(Path::new("Rakefile")), Some("ruby"));
        assert_eq!(language_for_path(Path::new("README")), None);
    }

    #[test]
    fn test_brace_language() {
        assert!(is_brace_language("rust"));
        assert!(is_brace_language("typescript"));
        assert!(!is_brace_language("python"));
        assert!(!is_brace_language("ruby"));
    }
}
