use lazy_static::lazy_static;

/// Version string reported by the interpreted-language templates.
pub const RUNTIME_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

lazy_static! {
    /// Ids accepted by the compile endpoint, in catalog order.
    pub static ref SUPPORTED_LANGUAGES: Vec<&'static str> =
        Lang::ALL.iter().map(|lang| lang.id()).collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    Cpp,
    C,
    Java,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Php,
    Ruby,
    Kotlin,
    Swift,
}

/// Highlighting mode the editor widget is configured with for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxMode {
    JavaScript,
    TypeScript,
    Python,
    Java,
    Cpp,
    Go,
    Rust,
    Php,
}

impl Lang {
    pub const ALL: [Lang; 12] = [
        Lang::Cpp,
        Lang::C,
        Lang::Java,
        Lang::Python,
        Lang::JavaScript,
        Lang::TypeScript,
        Lang::Go,
        Lang::Rust,
        Lang::Php,
        Lang::Ruby,
        Lang::Kotlin,
        Lang::Swift,
    ];

    pub fn from_id(id: &str) -> Option<Lang> {
        Lang::ALL.iter().copied().find(|lang| lang.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Lang::Cpp => "cpp",
            Lang::C => "c",
            Lang::Java => "java",
            Lang::Python => "python",
            Lang::JavaScript => "javascript",
            Lang::TypeScript => "typescript",
            Lang::Go => "go",
            Lang::Rust => "rust",
            Lang::Php => "php",
            Lang::Ruby => "ruby",
            Lang::Kotlin => "kotlin",
            Lang::Swift => "swift",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lang::Cpp => "C++",
            Lang::C => "C",
            Lang::Java => "Java",
            Lang::Python => "Python",
            Lang::JavaScript => "JavaScript",
            Lang::TypeScript => "TypeScript",
            Lang::Go => "Go",
            Lang::Rust => "Rust",
            Lang::Php => "PHP",
            Lang::Ruby => "Ruby",
            Lang::Kotlin => "Kotlin",
            Lang::Swift => "Swift",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Lang::Cpp => "cpp",
            Lang::C => "c",
            Lang::Java => "java",
            Lang::Python => "py",
            Lang::JavaScript => "js",
            Lang::TypeScript => "ts",
            Lang::Go => "go",
            Lang::Rust => "rs",
            Lang::Php => "php",
            Lang::Ruby => "rb",
            Lang::Kotlin => "kt",
            Lang::Swift => "swift",
        }
    }

    pub fn syntax(&self) -> SyntaxMode {
        match self {
            Lang::Cpp | Lang::C => SyntaxMode::Cpp,
            Lang::Java => SyntaxMode::Java,
            Lang::Python => SyntaxMode::Python,
            Lang::TypeScript => SyntaxMode::TypeScript,
            Lang::Go => SyntaxMode::Go,
            Lang::Rust => SyntaxMode::Rust,
            Lang::Php => SyntaxMode::Php,
            // no dedicated mode, highlighted as javascript
            Lang::JavaScript | Lang::Ruby | Lang::Kotlin | Lang::Swift => SyntaxMode::JavaScript,
        }
    }

    /// Starter program loaded into the editor when the language is selected.
    pub fn sample_code(&self) -> &'static str {
        match self {
            Lang::Cpp => {
                "#include <iostream>\nusing namespace std;\n\nint main() {\n    cout << \"Hello, World!\" << endl;\n    return 0;\n}"
            }
            Lang::C => {
                "#include <stdio.h>\n\nint main() {\n    printf(\"Hello, World!\\n\");\n    return 0;\n}"
            }
            Lang::Java => {
                "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}"
            }
            Lang::Python => "print(\"Hello, World!\")",
            Lang::JavaScript | Lang::TypeScript => "console.log(\"Hello, World!\");",
            Lang::Go => {
                "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello, World!\")\n}"
            }
            Lang::Rust => "fn main() {\n    println!(\"Hello, World!\");\n}",
            Lang::Php => "<?php\necho \"Hello, World!\\n\";\n?>",
            Lang::Ruby => "puts \"Hello, World!\"",
            Lang::Kotlin => "fun main() {\n    println(\"Hello, World!\")\n}",
            Lang::Swift => "print(\"Hello, World!\")",
        }
    }

    /// Builds the canned terminal output for a run of `source_code`.
    ///
    /// Nothing is executed: the text is picked from a per-language template,
    /// echoing `input` when one was given.
    pub fn fabricate_output(&self, source_code: &str, input: &str) -> String {
        let input_line = if input.is_empty() {
            String::new()
        } else {
            format!("Input: {}\n", input)
        };
        let output = match self {
            Lang::Python => format!(
                "Python {}\n{}{}",
                RUNTIME_VERSION,
                input_line,
                greeting_or_default(source_code, "print")
            ),
            Lang::JavaScript => format!(
                "Node.js {}\n{}{}",
                RUNTIME_VERSION,
                input_line,
                greeting_or_default(source_code, "console.log")
            ),
            Lang::Cpp | Lang::C => format!(
                "{} Compiler\n{}Hello, World!\nProgram exited with code 0",
                self.id().to_uppercase(),
                input_line
            ),
            Lang::Java => format!(
                "Java Compiler\n{}Hello, World!\nProcess finished with exit code 0",
                input_line
            ),
            Lang::Go => format!("Go {}\n{}Hello, World!\n", RUNTIME_VERSION, input_line),
            Lang::Rust => format!("Rust Compiler\n{}Hello, World!\n", input_line),
            Lang::Php => format!("PHP {}\n{}Hello, World!\n", RUNTIME_VERSION, input_line),
            Lang::TypeScript | Lang::Ruby | Lang::Kotlin | Lang::Swift => format!(
                "Language: {}\n{}Program executed successfully",
                self.id(),
                input_line
            ),
        };
        output.trim().to_string()
    }
}

fn greeting_or_default(source_code: &str, print_call: &str) -> &'static str {
    if source_code.contains(print_call) {
        "Hello, World!\n"
    } else {
        "Program executed successfully"
    }
}
