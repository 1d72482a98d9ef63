//! Name resolution against the catalog
//!
//! Walks a parsed statement, registers everything the FROM clause brings
//! into scope (tables, aliases, CTEs, derived tables, UNNEST), and checks
//! every table and column reference it can. Checks are deliberately
//! conservative: when a source's columns cannot be inferred, lookups against
//! it are skipped rather than guessed at.

use std::collections::HashMap;

use sqlparser::ast::{
    Delete, Expr, GroupByExpr, Ident, Insert, ObjectName, Query, Select, SelectItem, SetExpr,
    Statement, TableFactor, TableWithJoins,
};

use crate::catalog::{Catalog, QualifiedName, TableDef};
use crate::error::SchemaError;

/// One source visible in the current FROM scope.
#[derive(Debug, Clone)]
struct TableRef {
    table: QualifiedName,
    /// Column names when the source is a CTE or derived table. `None` means
    /// the source is a catalog table; an empty list means the columns could
    /// not be inferred and column checks against it are skipped.
    inferred_columns: Option<Vec<String>>,
}

impl TableRef {
    fn catalog(table: QualifiedName) -> Self {
        Self {
            table,
            inferred_columns: None,
        }
    }

    fn inferred(name: &str, columns: Vec<String>) -> Self {
        Self {
            table: QualifiedName::parse(name),
            inferred_columns: Some(columns),
        }
    }
}

/// Resolves table and column references in one statement.
pub(super) struct NameResolver<'a> {
    catalog: &'a Catalog,
    /// Scope key (lowercased alias or bare table name) -> source.
    tables: HashMap<String, TableRef>,
    /// CTE name (lowercased) -> inferred column names.
    ctes: HashMap<String, Vec<String>>,
    /// SELECT aliases visible while resolving ORDER BY.
    select_aliases: Vec<String>,
    errors: Vec<SchemaError>,
}

impl<'a> NameResolver<'a> {
    pub(super) fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            tables: HashMap::new(),
            ctes: HashMap::new(),
            select_aliases: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// The first failed lookup, if any. Analysis of a statement stops at
    /// its first schema error.
    pub(super) fn into_first_error(self) -> Option<SchemaError> {
        self.errors.into_iter().next()
    }

    fn error(&mut self, message: String) {
        self.errors.push(SchemaError::new(message));
    }

    pub(super) fn resolve_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Query(query) => self.resolve_query(query),
            Statement::Insert(insert) => self.resolve_insert(insert),
            Statement::Update {
                table,
                assignments,
                from,
                selection,
                ..
            } => self.resolve_update(table, assignments, from.as_ref(), selection.as_ref()),
            Statement::Delete(delete) => self.resolve_delete(delete),
            _ => {}
        }
    }

    fn resolve_query(&mut self, query: &Query) {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let cte_name = cte.alias.name.value.clone();
                let columns = if !cte.alias.columns.is_empty() {
                    cte.alias
                        .columns
                        .iter()
                        .map(|c| c.name.value.clone())
                        .collect()
                } else {
                    self.infer_columns(&cte.query.body)
                };

                // WITH RECURSIVE bodies reference themselves; register
                // before resolving so the recursive branch resolves.
                if with.recursive {
                    self.ctes
                        .insert(cte_name.to_ascii_lowercase(), columns.clone());
                }

                // CTE bodies resolve in their own table scope.
                let saved_tables = std::mem::take(&mut self.tables);
                self.resolve_set_expr(&cte.query.body);
                self.tables = saved_tables;

                self.ctes.insert(cte_name.to_ascii_lowercase(), columns);
            }
        }

        self.resolve_set_expr(&query.body);

        if let Some(order_by) = &query.order_by {
            let saved_aliases = std::mem::take(&mut self.select_aliases);
            self.select_aliases = collect_select_aliases(&query.body);
            for ob in &order_by.exprs {
                self.resolve_expr(&ob.expr);
            }
            self.select_aliases = saved_aliases;
        }
    }

    fn resolve_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Select(select) => self.resolve_select(select),
            SetExpr::Query(query) => self.resolve_query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.resolve_set_expr(left);
                self.resolve_set_expr(right);
            }
            _ => {}
        }
    }

    fn resolve_select(&mut self, select: &Select) {
        for table_with_joins in &select.from {
            self.resolve_table_with_joins(table_with_joins);
        }

        for item in &select.projection {
            self.resolve_select_item(item);
        }

        if let Some(selection) = &select.selection {
            self.resolve_expr(selection);
        }

        match &select.group_by {
            GroupByExpr::All(_) => {}
            GroupByExpr::Expressions(exprs, _) => {
                for expr in exprs {
                    self.resolve_expr(expr);
                }
            }
        }

        if let Some(having) = &select.having {
            self.resolve_expr(having);
        }
    }

    fn resolve_table_with_joins(&mut self, table: &TableWithJoins) {
        self.resolve_table_factor(&table.relation);

        for join in &table.joins {
            self.resolve_table_factor(&join.relation);
            self.resolve_join_condition(&join.join_operator);
        }
    }

    fn resolve_join_condition(&mut self, join_op: &sqlparser::ast::JoinOperator) {
        use sqlparser::ast::JoinConstraint;
        use sqlparser::ast::JoinOperator::*;

        let constraint = match join_op {
            Inner(c) | LeftOuter(c) | RightOuter(c) | FullOuter(c) | LeftSemi(c) | RightSemi(c)
            | LeftAnti(c) | RightAnti(c) => Some(c),
            _ => None,
        };

        match constraint {
            Some(JoinConstraint::On(expr)) => self.resolve_expr(expr),
            Some(JoinConstraint::Using(columns)) => {
                for col in columns {
                    self.resolve_column(None, col);
                }
            }
            _ => {}
        }
    }

    fn resolve_table_factor(&mut self, factor: &TableFactor) {
        match factor {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                // Table-valued function call: register the alias and skip
                // existence checks, columns are unknowable here.
                if args.is_some() {
                    if let Some(a) = alias {
                        let alias_name = a.name.value.clone();
                        self.tables.insert(
                            alias_name.to_ascii_lowercase(),
                            TableRef::inferred(&alias_name, alias_columns(a)),
                        );
                    }
                    return;
                }

                let table_name = object_name_to_qualified(name);

                // Single-part names may refer to a CTE.
                if let [bare] = table_name.parts() {
                    if let Some(columns) = self.ctes.get(&bare.to_ascii_lowercase()).cloned() {
                        let key = alias
                            .as_ref()
                            .map(|a| a.name.value.clone())
                            .unwrap_or_else(|| bare.clone());
                        self.tables
                            .insert(key.to_ascii_lowercase(), TableRef::inferred(bare, columns));
                        return;
                    }
                }

                if !self.catalog.table_exists(&table_name) {
                    self.error(format!("Table '{table_name}' not found"));
                    return;
                }

                let key = alias
                    .as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_else(|| table_name.base().to_string());
                self.tables
                    .insert(key.to_ascii_lowercase(), TableRef::catalog(table_name));
            }
            TableFactor::Derived {
                lateral,
                subquery,
                alias,
            } => {
                let saved_tables = self.tables.clone();
                // Non-lateral subqueries cannot see outer FROM entries.
                if !lateral {
                    self.tables.clear();
                }
                self.resolve_query(subquery);
                let derived_columns = self.infer_columns(&subquery.body);
                self.tables = saved_tables;

                if let Some(a) = alias {
                    let columns = if !a.columns.is_empty() {
                        alias_columns(a)
                    } else {
                        derived_columns
                    };
                    self.tables.insert(
                        a.name.value.to_ascii_lowercase(),
                        TableRef::inferred(&a.name.value, columns),
                    );
                }
            }
            TableFactor::UNNEST {
                alias, array_exprs, ..
            } => {
                for expr in array_exprs {
                    self.resolve_expr(expr);
                }
                if let Some(a) = alias {
                    self.tables.insert(
                        a.name.value.to_ascii_lowercase(),
                        TableRef::inferred(&a.name.value, Vec::new()),
                    );
                }
            }
            _ => {}
        }
    }

    fn resolve_select_item(&mut self, item: &SelectItem) {
        match item {
            SelectItem::UnnamedExpr(expr) => self.resolve_expr(expr),
            SelectItem::ExprWithAlias { expr, .. } => self.resolve_expr(expr),
            SelectItem::QualifiedWildcard(name, _) => {
                if let Some(first) = name.0.first() {
                    if !self
                        .tables
                        .contains_key(&first.value.to_ascii_lowercase())
                    {
                        self.error(format!(
                            "Table or alias '{}' not found in FROM clause",
                            first.value
                        ));
                    }
                }
            }
            SelectItem::Wildcard(_) => {}
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(ident) => self.resolve_column(None, ident),
            Expr::CompoundIdentifier(idents) => {
                // alias.column, or alias.struct_col.field: only the first
                // two segments are checked, struct access is not validated.
                if let [table, column, ..] = idents.as_slice() {
                    self.resolve_column(Some(table), column);
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::UnaryOp { expr, .. } => self.resolve_expr(expr),
            Expr::Nested(inner) => self.resolve_expr(inner),
            Expr::Function(func) => {
                self.resolve_function_args(&func.args);
                if let Some(filter) = &func.filter {
                    self.resolve_expr(filter);
                }
                if let Some(sqlparser::ast::WindowType::WindowSpec(spec)) = &func.over {
                    for e in &spec.partition_by {
                        self.resolve_expr(e);
                    }
                    for ob in &spec.order_by {
                        self.resolve_expr(&ob.expr);
                    }
                }
            }
            Expr::InList { expr, list, .. } => {
                self.resolve_expr(expr);
                for e in list {
                    self.resolve_expr(e);
                }
            }
            Expr::InSubquery { expr, subquery, .. } => {
                self.resolve_expr(expr);
                self.resolve_subquery(subquery);
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                self.resolve_expr(expr);
                self.resolve_expr(low);
                self.resolve_expr(high);
            }
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                if let Some(op) = operand {
                    self.resolve_expr(op);
                }
                for cond in conditions {
                    self.resolve_expr(cond);
                }
                for result in results {
                    self.resolve_expr(result);
                }
                if let Some(else_r) = else_result {
                    self.resolve_expr(else_r);
                }
            }
            Expr::Subquery(query) => self.resolve_subquery(query),
            Expr::Exists { subquery, .. } => self.resolve_subquery(subquery),
            Expr::IsNull(e) | Expr::IsNotNull(e) => self.resolve_expr(e),
            Expr::Cast { expr, .. } => self.resolve_expr(expr),
            Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
                self.resolve_expr(expr);
                self.resolve_expr(pattern);
            }
            Expr::Tuple(exprs) => {
                for e in exprs {
                    self.resolve_expr(e);
                }
            }
            Expr::Array(arr) => {
                for e in &arr.elem {
                    self.resolve_expr(e);
                }
            }
            // Literals and everything else carry no column references we
            // check.
            _ => {}
        }
    }

    /// Correlated subqueries see the outer scope; their own FROM entries
    /// must not leak back out.
    fn resolve_subquery(&mut self, query: &Query) {
        let saved_tables = self.tables.clone();
        self.resolve_query(query);
        self.tables = saved_tables;
    }

    fn resolve_function_args(&mut self, args: &sqlparser::ast::FunctionArguments) {
        use sqlparser::ast::{FunctionArg, FunctionArgExpr, FunctionArguments};

        if let FunctionArguments::List(arg_list) = args {
            for arg in &arg_list.args {
                let arg_expr = match arg {
                    FunctionArg::Unnamed(e) => e,
                    FunctionArg::Named { arg, .. } | FunctionArg::ExprNamed { arg, .. } => arg,
                };
                if let FunctionArgExpr::Expr(e) = arg_expr {
                    self.resolve_expr(e);
                }
            }
        }
    }

    fn resolve_column(&mut self, qualifier: Option<&Ident>, column: &Ident) {
        let column_name = &column.value;

        if let Some(qualifier) = qualifier {
            let Some(table_ref) = self.tables.get(&qualifier.value.to_ascii_lowercase()).cloned()
            else {
                self.error(format!(
                    "Table or alias '{}' not found in FROM clause",
                    qualifier.value
                ));
                return;
            };

            match &table_ref.inferred_columns {
                Some(columns) => {
                    if !inferred_contains(columns, column_name) {
                        let message = format!(
                            "Column '{}' not found in '{}'",
                            column_name, qualifier.value
                        );
                        self.error(message);
                    }
                }
                None => {
                    if let Some(table_def) = self.catalog.get_table(&table_ref.table) {
                        if !table_def.column_exists(column_name) {
                            let mut message = format!(
                                "Column '{}' not found in table '{}'",
                                column_name, table_ref.table
                            );
                            if let Some(suggestion) = find_similar_column(table_def, column_name) {
                                message.push_str(&format!("; did you mean '{suggestion}'?"));
                            }
                            self.error(message);
                        }
                    }
                }
            }
            return;
        }

        // Unqualified: search every source in scope.
        let mut found_in: Vec<String> = Vec::new();
        for (name, table_ref) in &self.tables {
            let matches = match &table_ref.inferred_columns {
                Some(columns) => inferred_contains(columns, column_name),
                None => self
                    .catalog
                    .get_table(&table_ref.table)
                    .is_some_and(|def| def.column_exists(column_name)),
            };
            if matches {
                found_in.push(name.clone());
            }
        }

        match found_in.len() {
            0 => {
                if self
                    .select_aliases
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(column_name))
                {
                    return;
                }

                let mut message = format!("Column '{column_name}' not found");
                let suggestion = self.tables.values().find_map(|table_ref| {
                    self.catalog
                        .get_table(&table_ref.table)
                        .and_then(|def| find_similar_column(def, column_name))
                });
                if let Some(suggestion) = suggestion {
                    message.push_str(&format!("; did you mean '{suggestion}'?"));
                }
                self.error(message);
            }
            1 => {}
            _ => {
                found_in.sort_unstable();
                self.error(format!(
                    "Column '{}' is ambiguous (found in {})",
                    column_name,
                    found_in.join(", ")
                ));
            }
        }
    }

    fn resolve_insert(&mut self, insert: &Insert) {
        let table_name = object_name_to_qualified(&insert.table_name);

        let Some(table_def) = self.catalog.get_table(&table_name) else {
            self.error(format!("Table '{table_name}' not found"));
            return;
        };

        for column in &insert.columns {
            if !table_def.column_exists(&column.value) {
                let mut message = format!(
                    "Column '{}' not found in table '{}'",
                    column.value, table_name
                );
                if let Some(suggestion) = find_similar_column(table_def, &column.value) {
                    message.push_str(&format!("; did you mean '{suggestion}'?"));
                }
                self.errors.push(SchemaError::new(message));
            }
        }

        let expected = if insert.columns.is_empty() {
            table_def.columns().count()
        } else {
            insert.columns.len()
        };

        if let Some(source) = &insert.source {
            if let SetExpr::Values(values) = source.body.as_ref() {
                for row in &values.rows {
                    if row.len() != expected {
                        self.error(format!(
                            "INSERT has {} value(s) but {} column(s) were specified",
                            row.len(),
                            expected
                        ));
                    }
                    for expr in row {
                        self.resolve_expr(expr);
                    }
                }
            } else {
                // INSERT ... SELECT
                self.resolve_set_expr(&source.body);
            }
        }
    }

    fn resolve_update(
        &mut self,
        table: &TableWithJoins,
        assignments: &[sqlparser::ast::Assignment],
        from: Option<&TableWithJoins>,
        selection: Option<&Expr>,
    ) {
        self.resolve_table_with_joins(table);
        if let Some(from_table) = from {
            self.resolve_table_with_joins(from_table);
        }

        let table_name = match &table.relation {
            TableFactor::Table { name, .. } => Some(object_name_to_qualified(name)),
            _ => None,
        };
        let table_def = table_name.as_ref().and_then(|n| self.catalog.get_table(n));

        for assignment in assignments {
            if let sqlparser::ast::AssignmentTarget::ColumnName(col_name) = &assignment.target {
                if let (Some(col), Some(def)) = (col_name.0.last(), table_def) {
                    if !def.column_exists(&col.value) {
                        let message = format!(
                            "Column '{}' not found in table '{}'",
                            col.value,
                            def.name
                        );
                        self.errors.push(SchemaError::new(message));
                    }
                }
            }
            self.resolve_expr(&assignment.value);
        }

        if let Some(where_expr) = selection {
            self.resolve_expr(where_expr);
        }
    }

    fn resolve_delete(&mut self, delete: &Delete) {
        let tables = match &delete.from {
            sqlparser::ast::FromTable::WithFromKeyword(tables) => tables,
            sqlparser::ast::FromTable::WithoutKeyword(tables) => tables,
        };
        for table in tables {
            self.resolve_table_with_joins(table);
        }

        if let Some(where_expr) = &delete.selection {
            self.resolve_expr(where_expr);
        }
    }

    /// Infer the column names a SELECT body produces. Returns an empty list
    /// (meaning "unverifiable") when a wildcard makes inference impossible.
    fn infer_columns(&self, set_expr: &SetExpr) -> Vec<String> {
        if let SetExpr::SetOperation { left, .. } = set_expr {
            return self.infer_columns(left);
        }

        let mut columns = Vec::new();
        if let SetExpr::Select(select) = set_expr {
            for (idx, item) in select.projection.iter().enumerate() {
                match item {
                    SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                        columns.push(ident.value.clone());
                    }
                    SelectItem::ExprWithAlias { alias, .. } => {
                        columns.push(alias.value.clone());
                    }
                    SelectItem::UnnamedExpr(Expr::CompoundIdentifier(idents)) => {
                        if let Some(col) = idents.last() {
                            columns.push(col.value.clone());
                        }
                    }
                    SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _) => {
                        return Vec::new();
                    }
                    _ => columns.push(format!("?column?{}", idx + 1)),
                }
            }
        }
        columns
    }
}

/// Membership test against inferred columns. An empty list or a placeholder
/// entry means the projection was not fully inferrable; treat as a match.
fn inferred_contains(columns: &[String], name: &str) -> bool {
    columns.is_empty()
        || columns.iter().any(|c| c.starts_with("?column?"))
        || columns.iter().any(|c| c.eq_ignore_ascii_case(name))
}

fn alias_columns(alias: &sqlparser::ast::TableAlias) -> Vec<String> {
    alias.columns.iter().map(|c| c.name.value.clone()).collect()
}

fn collect_select_aliases(set_expr: &SetExpr) -> Vec<String> {
    let mut aliases = Vec::new();
    if let SetExpr::Select(select) = set_expr {
        for item in &select.projection {
            match item {
                SelectItem::ExprWithAlias { alias, .. } => aliases.push(alias.value.clone()),
                SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                    aliases.push(ident.value.clone());
                }
                _ => {}
            }
        }
    }
    aliases
}

/// Convert sqlparser's ObjectName to our QualifiedName.
fn object_name_to_qualified(name: &ObjectName) -> QualifiedName {
    QualifiedName::new(name.0.iter().map(|ident| ident.value.clone()).collect())
}

/// Closest column by edit distance, for "did you mean" suggestions.
fn find_similar_column(table: &TableDef, name: &str) -> Option<String> {
    let name_lower = name.to_lowercase();
    let mut best: Option<(usize, &str)> = None;

    for column in table.columns() {
        let distance = edit_distance(&name_lower, &column.name.to_lowercase());
        if distance <= 3 && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, &column.name));
        }
    }

    best.map(|(_, name)| name.to_string())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (prev[j + 1] + 1)
                .min(current[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("name", "name"), 0);
        assert_eq!(edit_distance("nmae", "name"), 2);
    }
}
