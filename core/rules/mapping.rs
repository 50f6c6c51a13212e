// src/rules/mapping.rs
use crate::error::{AppError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Named file types accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    Python,
    Html,
    Css,
    Js,
    PythonHtml,
    All,
}

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::Python,
        FileKind::Html,
        FileKind::Css,
        FileKind::Js,
        FileKind::PythonHtml,
        FileKind::All,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FileKind::Python => "python",
            FileKind::Html => "html",
            FileKind::Css => "css",
            FileKind::Js => "js",
            FileKind::PythonHtml => "python_html",
            FileKind::All => "all",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FileKind::Python => "Python sources",
            FileKind::Html => "HTML templates",
            FileKind::Css => "Stylesheets",
            FileKind::Js => "JavaScript and JSX",
            FileKind::PythonHtml => "Python sources and HTML templates",
            FileKind::All => "Every known source type",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Python => &[".py"],
            FileKind::Html => &[".html"],
            FileKind::Css => &[".css"],
            FileKind::Js => &[".js", ".jsx"],
            FileKind::PythonHtml => &[".py", ".html"],
            FileKind::All => &[".py", ".html", ".css", ".js", ".jsx"],
        }
    }

    /// The single kind whose outputs cover all of `kinds`.
    pub fn combine(kinds: &[FileKind]) -> FileKind {
        match kinds {
            [single] => *single,
            [FileKind::Python, FileKind::Html] | [FileKind::Html, FileKind::Python] => {
                FileKind::PythonHtml
            }
            _ => FileKind::All,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FileKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(FileKind::Python),
            "html" => Ok(FileKind::Html),
            "css" => Ok(FileKind::Css),
            "js" | "javascript" => Ok(FileKind::Js),
            "python_html" | "both" => Ok(FileKind::PythonHtml),
            "all" | "any" => Ok(FileKind::All),
            _ => Err(AppError::UnknownType(s.to_string())),
        }
    }
}

/// Parses type keys and returns them with the union of their extensions.
pub fn resolve_kinds<S: AsRef<str>>(keys: &[S]) -> Result<(Vec<FileKind>, BTreeSet<&'static str>)> {
    if keys.is_empty() {
        return Err(AppError::InvalidArgument(
            "At least one file type is required".to_string(),
        ));
    }
    let mut kinds = Vec::new();
    let mut extensions = BTreeSet::new();
    for key in keys {
        let kind: FileKind = key.as_ref().parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
        extensions.extend(kind.extensions().iter().copied());
    }
    Ok((kinds, extensions))
}

/// Default file-name to group-label rules, in priority order.
pub fn default_file_groups() -> Vec<(&'static str, &'static str)> {
    vec![
        ("models.py", "models"),
        ("views.py", "views"),
        ("urls.py", "urls"),
        ("forms.py", "forms"),
        ("admin.py", "admin"),
        ("serializers.py", "serializers"),
        ("tests.py", "tests"),
        ("settings.py", "settings"),
        ("apps.py", "apps"),
        (".html", "templates"),
        ("test_*.py", "tests"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for kind in FileKind::ALL {
            assert_eq!(kind.key().parse::<FileKind>().unwrap(), kind);
        }
        assert_eq!("ANY".parse::<FileKind>().unwrap(), FileKind::All);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "rust".parse::<FileKind>().unwrap_err();
        assert!(matches!(err, AppError::UnknownType(ref k) if k == "rust"));
    }

    #[test]
    fn kinds_union_extensions() {
        let (kinds, exts) = resolve_kinds(&["python", "css", "py"]).unwrap();
        assert_eq!(kinds, vec![FileKind::Python, FileKind::Css]);
        assert_eq!(exts.into_iter().collect::<Vec<_>>(), vec![".css", ".py"]);
        assert!(resolve_kinds::<&str>(&[]).is_err());
    }

    #[test]
    fn combined_kind_picks_shared_output() {
        assert_eq!(FileKind::combine(&[FileKind::Css]), FileKind::Css);
        assert_eq!(
            FileKind::combine(&[FileKind::Html, FileKind::Python]),
            FileKind::PythonHtml
        );
        assert_eq!(
            FileKind::combine(&[FileKind::Css, FileKind::Js]),
            FileKind::All
        );
    }
}
