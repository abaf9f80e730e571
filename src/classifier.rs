//! SQL statement classification for sqly
//!
//! Statements are classified by their leading keyword only. The keyword is
//! the first word token of the statement (whitespace and comments are
//! skipped), compared case-insensitively against four disjoint sets:
//!
//! - DDL: CREATE, DROP, ALTER, REINDEX
//! - DML: SELECT, INSERT, UPDATE, DELETE, EXPLAIN, WITH
//! - TCL: BEGIN, COMMIT, ROLLBACK, SAVEPOINT, RELEASE
//! - DCL: GRANT, REVOKE

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Data definition language keywords
pub const DDL: [&str; 4] = ["CREATE", "DROP", "ALTER", "REINDEX"];

/// Data manipulation language keywords
pub const DML: [&str; 6] = ["SELECT", "INSERT", "UPDATE", "DELETE", "EXPLAIN", "WITH"];

/// Transaction control language keywords
pub const TCL: [&str; 5] = ["BEGIN", "COMMIT", "ROLLBACK", "SAVEPOINT", "RELEASE"];

/// Data control language keywords
pub const DCL: [&str; 2] = ["GRANT", "REVOKE"];

/// Keyword category of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ddl,
    Dml,
    Tcl,
    Dcl,
}

impl Category {
    /// Keywords that belong to this category
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Ddl => &DDL,
            Category::Dml => &DML,
            Category::Tcl => &TCL,
            Category::Dcl => &DCL,
        }
    }

    /// Human-readable name of the category
    pub fn language(&self) -> &'static str {
        match self {
            Category::Ddl => "data definition language",
            Category::Dml => "data manipulation language",
            Category::Tcl => "transaction control language",
            Category::Dcl => "data control language",
        }
    }
}

/// Leading keyword of a statement, upper-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingKeyword(String);

impl LeadingKeyword {
    /// Extract the leading keyword of a statement
    ///
    /// Uses the SQL tokenizer so that `SELECT*FROM t` and statements preceded
    /// by comments classify correctly. Quoted identifiers are never keywords.
    /// Input the tokenizer rejects falls back to the first whitespace-delimited
    /// token.
    pub fn of(sql: &str) -> Self {
        let dialect = SQLiteDialect {};
        let keyword = match Tokenizer::new(&dialect, sql).tokenize() {
            Ok(tokens) => tokens
                .into_iter()
                .find(|token| !matches!(token, Token::Whitespace(_)))
                .map(|token| match token {
                    Token::Word(word) if word.quote_style.is_none() => word.value,
                    other => other.to_string(),
                })
                .unwrap_or_default(),
            Err(_) => sql.split_whitespace().next().unwrap_or_default().to_string(),
        };
        LeadingKeyword(keyword.to_uppercase())
    }

    /// Get the keyword text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category of the keyword, if it belongs to one
    pub fn category(&self) -> Option<Category> {
        [Category::Ddl, Category::Dml, Category::Tcl, Category::Dcl]
            .into_iter()
            .find(|category| category.keywords().contains(&self.as_str()))
    }

    pub fn is_ddl(&self) -> bool {
        DDL.contains(&self.as_str())
    }

    pub fn is_dml(&self) -> bool {
        DML.contains(&self.as_str())
    }

    pub fn is_tcl(&self) -> bool {
        TCL.contains(&self.as_str())
    }

    pub fn is_dcl(&self) -> bool {
        DCL.contains(&self.as_str())
    }

    pub fn is_select(&self) -> bool {
        self.as_str() == "SELECT"
    }

    pub fn is_insert(&self) -> bool {
        self.as_str() == "INSERT"
    }

    pub fn is_update(&self) -> bool {
        self.as_str() == "UPDATE"
    }

    pub fn is_delete(&self) -> bool {
        self.as_str() == "DELETE"
    }

    pub fn is_explain(&self) -> bool {
        self.as_str() == "EXPLAIN"
    }

    pub fn is_with_cte(&self) -> bool {
        self.as_str() == "WITH"
    }
}

/// Whether anything other than whitespace or comments follows the first `;`
///
/// Semicolons inside string literals and quoted identifiers do not count.
/// Input the tokenizer rejects is reported as a single statement and left
/// to the engine.
pub fn has_trailing_statement(sql: &str) -> bool {
    let dialect = SQLiteDialect {};
    let Ok(tokens) = Tokenizer::new(&dialect, sql).tokenize() else {
        return false;
    };
    tokens
        .iter()
        .skip_while(|token| !matches!(token, Token::SemiColon))
        .skip(1)
        .any(|token| !matches!(token, Token::Whitespace(_) | Token::SemiColon))
}
