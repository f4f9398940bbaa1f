/*
 * Created on Thu Feb 12 2026
 *
 * This file is a part of AIMDB
 * AIMDB is an in-memory analytical database engine that loads a
 * star-schema dataset from tab-separated files and executes
 * precompiled query plans against a single-threaded storage and
 * execution core.
 *
 * Copyright (c) 2026, AIMDB Contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! Turns a `SelectQuery` plan descriptor into an operator tree and
//! drives it page by page. There is no query planner here beyond the
//! fixed build order spec'd in the component design: per-table
//! scan/filter pipelines, joined along LINK predicates in declaration
//! order, then Project, then GroupBy, then HAVING filters, then
//! OrderBy.

use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::catalog::{Catalog, ObjectId};
use crate::engine::data::ColumnType;
use crate::engine::mem::Arena;
use crate::engine::operators::{Filter, GroupBy, GroupOutputColumn, HashJoin, Operator, OrderBy, Project, Scan};
use crate::engine::plan::{CompareOp, Condition, Rhs, SelectQuery};
use crate::engine::result::ResultTable;
use crate::util::error::{DbError, DbResult};

pub struct Executor {
    arena: Rc<Arena>,
    root: Option<Box<dyn Operator>>,
}

impl Executor {
    pub fn new(arena: Rc<Arena>) -> Self {
        Executor { arena, root: None }
    }

    /// A page-sized buffer matching the current plan's output schema.
    /// `None` before any successful build.
    pub fn new_result_buffer(&self) -> Option<ResultTable> {
        self.root.as_ref().map(|r| ResultTable::paged(r.schema().to_vec()))
    }

    /// Builds a fresh plan (when `query` is `Some`) and/or resumes the
    /// current one, draining rows into `out` (reset first) until it is
    /// full or the tree is exhausted. Returns whether any row was
    /// produced this call; `false` both closes the tree and clears the
    /// current plan.
    pub fn exec(&mut self, catalog: &Catalog, db_id: ObjectId, query: Option<&SelectQuery>, out: &mut ResultTable) -> DbResult<bool> {
        if let Some(q) = query {
            if let Some(mut old) = self.root.take() {
                let _ = old.close();
            }
            let mut tree = build_tree(catalog, db_id, &self.arena, q).map_err(|e| {
                log::error!("failed to build query plan: {e}");
                e
            })?;
            tree.init()?;
            log::info!("query plan built: {} output column(s)", tree.schema().len());
            *out = ResultTable::paged(tree.schema().to_vec());
            self.root = Some(tree);
        }

        let root = match self.root.as_mut() {
            Some(r) => r,
            None => return Err(DbError::MissingDatabase),
        };

        out.reset();
        let schema = root.schema().to_vec();
        let mut tmp = ResultTable::one_row(schema);
        loop {
            if out.is_full() {
                break;
            }
            match root.next(&mut tmp) {
                Ok(true) => {
                    let row = out.push_row_grow();
                    out.copy_row_from(row, &tmp, 0);
                }
                Ok(false) => {
                    let _ = root.close();
                    self.root = None;
                    break;
                }
                Err(e) => {
                    log::error!("query execution failed mid-stream: {e}");
                    let _ = root.close();
                    self.root = None;
                    return Err(e);
                }
            }
        }
        Ok(out.row_count() > 0)
    }
}

struct FromTable {
    id: ObjectId,
    names: Vec<String>,
}

fn resolve_from_tables(catalog: &Catalog, db_id: ObjectId, query: &SelectQuery) -> DbResult<Vec<FromTable>> {
    query
        .from_tables
        .iter()
        .map(|name| {
            let id = catalog.table_id(db_id, name)?;
            let names = catalog.table(id).columns.iter().map(|&c| catalog.column(c).name.clone()).collect();
            Ok(FromTable { id, names })
        })
        .collect()
}

/// Locates `column` among `tables`, returning its from-table index and
/// row position. Errors if no table declares it.
fn find_column(catalog: &Catalog, tables: &[FromTable], column: &str) -> DbResult<(usize, usize, ColumnType)> {
    for (i, t) in tables.iter().enumerate() {
        if let Ok(cid) = catalog.column_id(t.id, column) {
            let obj = catalog.column(cid);
            return Ok((i, obj.index_in_row, obj.ty));
        }
    }
    Err(DbError::UnknownColumn {
        table: "<any FROM table>".to_string(),
        column: column.to_string(),
    })
}

fn position_of(names: &[String], column: &str) -> DbResult<usize> {
    names
        .iter()
        .position(|n| n == column)
        .ok_or_else(|| DbError::UnknownColumn {
            table: "<current output>".to_string(),
            column: column.to_string(),
        })
}

fn build_filter(child: Box<dyn Operator>, column: usize, ty: ColumnType, op: CompareOp, rhs: &Rhs) -> DbResult<Box<dyn Operator>> {
    let text = match rhs {
        Rhs::Literal(s) => s,
        Rhs::Column(_) => {
            return Err(DbError::Malformed {
                reason: "a non-LINK condition cannot compare two columns".to_string(),
            })
        }
    };
    let mut constant = vec![0u8; ty.byte_width()];
    ty.format_binary(text, &mut constant)?;
    Ok(Box::new(Filter::new(child, column, op, constant)))
}

fn build_tree(catalog: &Catalog, db_id: ObjectId, arena: &Rc<Arena>, query: &SelectQuery) -> DbResult<Box<dyn Operator>> {
    if query.from_tables.is_empty() {
        return Err(DbError::Malformed { reason: "query has no FROM tables".to_string() });
    }
    let tables = resolve_from_tables(catalog, db_id, query)?;

    // Step 1: classify WHERE conditions into per-table filters and join edges.
    let mut per_table_filters: Vec<Vec<&Condition>> = tables.iter().map(|_| Vec::new()).collect();
    let mut join_edges: Vec<(usize, usize, usize, usize)> = Vec::new();
    for cond in &query.where_conditions {
        if cond.is_link() {
            let rhs_name = match &cond.rhs {
                Rhs::Column(c) => c.clone(),
                Rhs::Literal(_) => {
                    return Err(DbError::Malformed {
                        reason: "a LINK condition's right-hand side must name a column".to_string(),
                    })
                }
            };
            let (ta, cola, _) = find_column(catalog, &tables, &cond.column)?;
            let (tb, colb, _) = find_column(catalog, &tables, &rhs_name)?;
            join_edges.push((ta, cola, tb, colb));
        } else {
            let (ti, _, _) = find_column(catalog, &tables, &cond.column)?;
            per_table_filters[ti].push(cond);
        }
    }

    // Step 2: per-table Scan -> Filter* pipelines.
    let mut slots: HashMap<usize, Box<dyn Operator>> = HashMap::new();
    let mut group_id: Vec<usize> = (0..tables.len()).collect();
    let mut offset_in_group: Vec<usize> = vec![0; tables.len()];
    for (i, t) in tables.iter().enumerate() {
        let table_obj = catalog.table(t.id);
        let mut op: Box<dyn Operator> = Box::new(Scan::new(Rc::clone(&table_obj.row_table)));
        for cond in &per_table_filters[i] {
            let (_, col, ty) = find_column(catalog, &tables, &cond.column)?;
            op = build_filter(op, col, ty, cond.op, &cond.rhs)?;
        }
        slots.insert(i, op);
    }

    // Step 3: combine via HashJoin along LINK edges, declaration order.
    for (ta, cola, tb, colb) in join_edges {
        let ra = group_id[ta];
        let rb = group_id[tb];
        if ra == rb {
            log::warn!("ignoring redundant join predicate between columns already in the same relation");
            continue;
        }
        let left_op = slots.remove(&ra).expect("group id must have a live slot");
        let right_op = slots.remove(&rb).expect("group id must have a live slot");
        let left_col = offset_in_group[ta] + cola;
        let right_col = offset_in_group[tb] + colb;
        let left_len = left_op.schema().len();
        let right_len = right_op.schema().len();
        let joined = HashJoin::new(Rc::clone(arena), left_op, left_col, right_op, right_col);
        let left_first = joined.left_was_probe();
        if left_first {
            for (idx, g) in group_id.iter_mut().enumerate() {
                if *g == rb {
                    offset_in_group[idx] += left_len;
                }
            }
        } else {
            for (idx, g) in group_id.iter_mut().enumerate() {
                if *g == ra {
                    offset_in_group[idx] += right_len;
                }
            }
        }
        for g in group_id.iter_mut() {
            if *g == rb {
                *g = ra;
            }
        }
        slots.insert(ra, Box::new(joined));
    }

    if slots.len() != 1 {
        return Err(DbError::Malformed {
            reason: "FROM tables are not fully connected by LINK predicates".to_string(),
        });
    }
    let (&only_group, _) = slots.iter().next().unwrap();
    let mut tree = slots.remove(&only_group).unwrap();

    // Names of each column in `tree`'s current schema, for name-based
    // resolution by Project/GroupBy/HAVING/OrderBy.
    let total_cols = tree.schema().len();
    let mut current_names = vec![String::new(); total_cols];
    for (i, t) in tables.iter().enumerate() {
        for (j, name) in t.names.iter().enumerate() {
            current_names[offset_in_group[i] + j] = name.clone();
        }
    }

    // Step 4: Project.
    if !query.select_columns.is_empty() {
        let columns = query
            .select_columns
            .iter()
            .map(|sc| position_of(&current_names, &sc.column))
            .collect::<DbResult<Vec<usize>>>()?;
        tree = Box::new(Project::new(tree, columns));
        current_names = query.select_columns.iter().map(|sc| sc.column.clone()).collect();
    }

    // Step 5: GroupBy.
    if !query.groupby_columns.is_empty() {
        let outputs = query
            .select_columns
            .iter()
            .enumerate()
            .map(|(i, sc)| {
                if sc.aggregate == crate::engine::plan::AggregateMethod::None {
                    GroupOutputColumn::Key(i)
                } else {
                    GroupOutputColumn::Aggregate(i, sc.aggregate)
                }
            })
            .collect();
        tree = Box::new(GroupBy::new(Rc::clone(arena), tree, outputs));
        // current_names is already the select list, unchanged in order.

        // Step 5.5: HAVING, against the post-aggregation schema.
        let having_schema = tree.schema().to_vec();
        for cond in &query.having_conditions {
            if cond.is_link() {
                return Err(DbError::Malformed {
                    reason: "HAVING does not support LINK conditions".to_string(),
                });
            }
            let pos = position_of(&current_names, &cond.column)?;
            tree = build_filter(tree, pos, having_schema[pos], cond.op, &cond.rhs)?;
        }
    }

    // Step 6: OrderBy.
    if !query.orderby_columns.is_empty() {
        let positions = query
            .orderby_columns
            .iter()
            .map(|c| position_of(&current_names, c))
            .collect::<DbResult<Vec<usize>>>()?;
        tree = Box::new(OrderBy::new(tree, positions));
    }

    Ok(tree)
}
