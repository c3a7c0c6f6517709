//! Column-role resolution.
//!
//! The input file has no fixed schema; each semantic role is bound to the
//! first header whose trimmed, lower-cased form contains one of the role's
//! substring patterns. The binding is built once per table and never changes.

use std::fmt;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::table::Table;

/// A semantic purpose a column serves, independent of its literal header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Produto,
    Marca,
    Vendedor,
    Total,
    Quantidade,
    Preco,
    Frete,
    Catalogo,
}

impl Role {
    pub const REQUIRED: [Role; 6] = [
        Role::Produto,
        Role::Marca,
        Role::Vendedor,
        Role::Total,
        Role::Quantidade,
        Role::Preco,
    ];

    /// Substring patterns tried in order against each header.
    pub const fn patterns(self) -> &'static [&'static str] {
        match self {
            Role::Produto => &["prod"],
            Role::Marca => &["marc"],
            Role::Vendedor => &["vend"],
            Role::Total => &["total"],
            Role::Quantidade => &["qt", "quant"],
            Role::Preco => &["pre", "valor"],
            Role::Frete => &["frete"],
            Role::Catalogo => &["cata", "catalog"],
        }
    }

    /// Frete and catálogo are optional: their absence only disables the
    /// charts that depend on them.
    pub const fn is_required(self) -> bool {
        !matches!(self, Role::Frete | Role::Catalogo)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Produto => "produto",
            Role::Marca => "marca",
            Role::Vendedor => "vendedor",
            Role::Total => "total",
            Role::Quantidade => "quantidade",
            Role::Preco => "preço",
            Role::Frete => "frete",
            Role::Catalogo => "catálogo",
        };
        f.write_str(name)
    }
}

/// The binding from role to actual header name for one loaded table.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnMap {
    pub produto: String,
    pub marca: String,
    pub vendedor: String,
    pub total: String,
    pub quantidade: String,
    pub preco: String,
    pub frete: Option<String>,
    pub catalogo: Option<String>,
}

/// First header (in original column order) matching the role's patterns.
fn find_column(table: &Table, role: Role) -> Option<String> {
    table
        .headers()
        .iter()
        .find(|header| {
            let normalized = header.trim().to_lowercase();
            role.patterns()
                .iter()
                .any(|pattern| normalized.contains(pattern))
        })
        .cloned()
}

/// Bind every semantic role to a column of the table.
///
/// Fails with [`PipelineError::MissingColumn`] naming the first required
/// role that has no candidate. Optional roles resolve to `None` instead.
pub fn resolve_columns(table: &Table) -> PipelineResult<ColumnMap> {
    let require = |role: Role| find_column(table, role).ok_or(PipelineError::MissingColumn(role));

    let frete = find_column(table, Role::Frete);
    if frete.is_none() {
        log::warn!("no '{}' column in the header row; shipping chart disabled", Role::Frete);
    }
    let catalogo = find_column(table, Role::Catalogo);
    if catalogo.is_none() {
        log::warn!("no '{}' column in the header row; catalog chart disabled", Role::Catalogo);
    }

    Ok(ColumnMap {
        produto: require(Role::Produto)?,
        marca: require(Role::Marca)?,
        vendedor: require(Role::Vendedor)?,
        total: require(Role::Total)?,
        quantidade: require(Role::Quantidade)?,
        preco: require(Role::Preco)?,
        frete,
        catalogo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(headers: &[&str]) -> Table {
        Table::new(headers.iter().map(|h| h.to_string()).collect())
    }

    #[test]
    fn resolves_every_role_from_typical_headers() {
        let table = table_with(&[
            "Produto", "Marca", "Vendedor", "Valor Total", "Qtde", "Preço Unitário", "Frete Grátis",
            "Catalogo",
        ]);
        let columns = resolve_columns(&table).unwrap();
        assert_eq!(columns.produto, "produto");
        assert_eq!(columns.marca, "marca");
        assert_eq!(columns.vendedor, "vendedor");
        assert_eq!(columns.total, "valor total");
        assert_eq!(columns.quantidade, "qtde");
        assert_eq!(columns.frete.as_deref(), Some("frete grátis"));
        assert_eq!(columns.catalogo.as_deref(), Some("catalogo"));
    }

    #[test]
    fn first_match_in_column_order_wins() {
        // Both headers contain "prod"; the earlier one is chosen.
        let table = table_with(&[
            "produto principal",
            "produto secundário",
            "marca",
            "vendedor",
            "total",
            "qtde",
            "preço",
        ]);
        let columns = resolve_columns(&table).unwrap();
        assert_eq!(columns.produto, "produto principal");
    }

    #[test]
    fn missing_required_role_names_the_role() {
        let table = table_with(&["produto", "marca", "total", "qtde", "preço"]);
        let err = resolve_columns(&table).unwrap_err();
        match err {
            PipelineError::MissingColumn(role) => assert_eq!(role, Role::Vendedor),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn optional_roles_resolve_to_none_without_error() {
        let table = table_with(&["produto", "marca", "vendedor", "total", "qtde", "preço"]);
        let columns = resolve_columns(&table).unwrap();
        assert!(columns.frete.is_none());
        assert!(columns.catalogo.is_none());
    }

    #[test]
    fn required_roles_are_exactly_the_six_core_roles() {
        assert!(Role::REQUIRED.iter().all(|role| role.is_required()));
        assert!(!Role::Frete.is_required());
        assert!(!Role::Catalogo.is_required());
    }

    #[test]
    fn accented_catalogo_header_does_not_match() {
        // "catálogo" contains neither "cata" nor "catalog" literally; the
        // resolver is a plain byte-substring search, same as the dashboard
        // always behaved.
        let table = table_with(&["produto", "marca", "vendedor", "total", "qtde", "preço", "catálogo"]);
        let columns = resolve_columns(&table).unwrap();
        assert!(columns.catalogo.is_none());
    }

    #[test]
    fn valor_matches_the_price_role() {
        let table = table_with(&["produto", "marca", "vendedor", "total geral", "quantidade", "valor unitário"]);
        let columns = resolve_columns(&table).unwrap();
        assert_eq!(columns.preco, "valor unitário");
        assert_eq!(columns.total, "total geral");
    }
}
