//! PostgREST-style table query description

/// A joined relation: `alias:foreign_key(columns)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: String,
    /// Table the foreign key points at
    pub table: String,
    /// Column on the base row holding the referenced id
    pub foreign_key: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: String,
    pub columns: String,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl TableQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn embed(mut self, alias: &str, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        self.embeds.push(Embed {
            alias: alias.to_string(),
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The `select=` parameter, embeds included
    pub fn select_clause(&self) -> String {
        let mut clause = self.columns.clone();
        for embed in &self.embeds {
            clause.push_str(&format!(
                ",{}:{}({})",
                embed.alias,
                embed.foreign_key,
                embed.columns.join(",")
            ));
        }
        clause
    }

    /// Query-string pairs in PostgREST syntax
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select_clause())];
        for filter in &self.filters {
            pairs.push((filter.column.clone(), format!("eq.{}", filter.value)));
        }
        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let query = TableQuery::from("token_transactions")
            .embed(
                "token_contracts",
                "token_contracts",
                "token_contract_id",
                &["name", "symbol", "decimals"],
            )
            .embed("from_user", "user_profiles", "from_user_id", &["full_name", "wallet_address"])
            .eq("token_contract_id", "c1")
            .order_desc("created_at")
            .limit(50);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                (
                    "select".to_string(),
                    "*,token_contracts:token_contract_id(name,symbol,decimals),from_user:from_user_id(full_name,wallet_address)"
                        .to_string()
                ),
                ("token_contract_id".to_string(), "eq.c1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_select() {
        let query = TableQuery::from("token_contracts");
        assert_eq!(
            query.to_query_pairs(),
            vec![("select".to_string(), "*".to_string())]
        );
    }
}
