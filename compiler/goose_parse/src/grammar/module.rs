//! `import` and `export`.

use goose_ir::ast::{ExportName, ImportDecl, ShowClause, ShowField, StmtKind};
use goose_lexer::TokenKind;

use crate::{PResult, Parser};

impl Parser {
    pub(crate) fn parse_import(&mut self) -> PResult<StmtKind> {
        self.expect(&TokenKind::Import, "'import'")?;
        Ok(StmtKind::Import(self.parse_import_spec()?))
    }

    pub(crate) fn parse_export(&mut self) -> PResult<StmtKind> {
        self.expect(&TokenKind::Export, "'export'")?;
        match self.current_kind() {
            TokenKind::Str(_) => Ok(StmtKind::ExportSpec(self.parse_import_spec()?)),
            TokenKind::LBrace => Ok(StmtKind::ExportList(self.parse_export_list()?)),
            TokenKind::Symbol
            | TokenKind::Fn
            | TokenKind::Async
            | TokenKind::Memo
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Struct
            | TokenKind::Generator
            | TokenKind::Native => Ok(StmtKind::ExportDecl(Box::new(self.parse_stmt()?))),
            _ => Err(self.error_expected("module specifier, export list, or declaration")),
        }
    }

    /// `"spec" [as name | show ... | show { fields }]`
    fn parse_import_spec(&mut self) -> PResult<ImportDecl> {
        let (specifier, specifier_span) = self.expect_plain_string("module specifier")?;
        let mut decl = ImportDecl {
            specifier,
            specifier_span,
            alias: None,
            show: None,
        };

        if self.eat(&TokenKind::As) {
            decl.alias = Some(self.expect_ident("alias after 'as'")?);
        } else if self.eat(&TokenKind::Show) {
            if self.eat(&TokenKind::Ellipsis) {
                decl.show = Some(ShowClause::All);
            } else if self.eat(&TokenKind::LBrace) {
                decl.show = Some(ShowClause::Fields(self.parse_show_fields()?));
            } else {
                return Err(self.error_expected("'...' or import list"));
            }
        }
        Ok(decl)
    }

    /// Fields of `show { ... }` up to and including the closing brace.
    /// Once `...rest` appears only submodule specs may follow.
    fn parse_show_fields(&mut self) -> PResult<Vec<ShowField>> {
        let mut fields = Vec::new();
        let mut saw_rest = false;
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let field = match self.current_kind() {
                TokenKind::Ellipsis => {
                    self.advance();
                    saw_rest = true;
                    ShowField::Rest(self.expect_ident("name after '...'")?)
                }
                TokenKind::Ident(_) if !saw_rest => {
                    let name = self.expect_ident("name")?;
                    let alias = if self.eat(&TokenKind::As) {
                        Some(self.expect_ident("alias after 'as'")?)
                    } else {
                        None
                    };
                    ShowField::Name { name, alias }
                }
                TokenKind::Str(_) => ShowField::Spec(self.parse_import_spec()?),
                _ if saw_rest => {
                    return Err(self.error_expected("submodule import or end of import list"))
                }
                _ => return Err(self.error_expected("identifier or submodule import")),
            };
            fields.push(field);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(fields)
    }

    /// `{ a, b as c }`
    fn parse_export_list(&mut self) -> PResult<Vec<ExportName>> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut names = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let name = self.expect_ident("identifier")?;
            let alias = if self.eat(&TokenKind::As) {
                Some(self.expect_ident("alias after 'as'")?)
            } else {
                None
            };
            names.push(ExportName { name, alias });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(names)
    }
}
