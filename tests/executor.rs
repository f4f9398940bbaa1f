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

//! End-to-end TPC-H-lite scenarios from `spec.md` §8, built against an
//! in-process catalog populated with literal fixture rows (no files on
//! disk — that path belongs to `loader`'s own tests).

use std::rc::Rc;

use aimdb::engine::data::ColumnType;
use aimdb::engine::mem::{Arena, DEFAULT_DIRECTORY_CAPACITY, DEFAULT_PAGE_SIZE};
use aimdb::engine::plan::{AggregateMethod, CompareOp, Condition, Rhs, SelectColumn, SelectQuery};
use aimdb::engine::row::RowTable;
use aimdb::engine::{Catalog, Executor, ResultTable};

fn charn(text: &str, n: usize) -> Vec<u8> {
    let ty = ColumnType::CharN(n);
    let mut buf = vec![0u8; n];
    ty.format_binary(text, &mut buf).unwrap();
    buf
}

fn read_text(out: &ResultTable, row: usize, col: usize) -> String {
    out.column_type(col).format_text(out.get(row, col))
}

/// A small TPC-H-lite fixture: `supplier`, `partsupp`, `customer`,
/// `orders`, wired up directly through the catalog and row tables (no
/// schema/data files involved).
struct Fixture {
    catalog: Catalog,
    db_id: usize,
}

fn build_fixture() -> Fixture {
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut catalog = Catalog::new();
    let db_id = catalog.create_database("tpch").unwrap();

    let supplier = Rc::new(RowTable::new(
        Rc::clone(&arena),
        vec![ColumnType::Int32, ColumnType::CharN(16), ColumnType::Int32],
        DEFAULT_PAGE_SIZE,
        DEFAULT_DIRECTORY_CAPACITY,
    ));
    let supplier_id = catalog.create_table(db_id, "supplier", Rc::clone(&supplier)).unwrap();
    catalog.add_column(supplier_id, "s_suppkey", ColumnType::Int32).unwrap();
    catalog.add_column(supplier_id, "s_name", ColumnType::CharN(16)).unwrap();
    catalog.add_column(supplier_id, "s_nationkey", ColumnType::Int32).unwrap();
    for (key, name, nation) in [(1, "Supplier1", 18), (2, "Supplier2", 5), (3, "Supplier3", 18), (4, "Supplier4", 9), (5, "Supplier5", 18)] {
        supplier
            .insert_columns(&[&(key as i32).to_le_bytes(), &charn(name, 16), &(nation as i32).to_le_bytes()])
            .unwrap();
    }

    let partsupp = Rc::new(RowTable::new(
        Rc::clone(&arena),
        vec![ColumnType::Int32, ColumnType::Int32, ColumnType::Int32, ColumnType::Float64],
        DEFAULT_PAGE_SIZE,
        DEFAULT_DIRECTORY_CAPACITY,
    ));
    let partsupp_id = catalog.create_table(db_id, "partsupp", Rc::clone(&partsupp)).unwrap();
    catalog.add_column(partsupp_id, "ps_partkey", ColumnType::Int32).unwrap();
    catalog.add_column(partsupp_id, "ps_suppkey", ColumnType::Int32).unwrap();
    catalog.add_column(partsupp_id, "ps_availqty", ColumnType::Int32).unwrap();
    catalog.add_column(partsupp_id, "ps_supplycost", ColumnType::Float64).unwrap();
    for (partkey, suppkey, availqty, supplycost) in [
        (100, 6, 5000, 1000.0),
        (100, 6, 3000, 1500.0),
        (200, 6, 9000, 500.0),
        (300, 6, 1000, 2500.0),
        (400, 7, 2000, 100.0),
    ] {
        partsupp
            .insert_columns(&[
                &(partkey as i32).to_le_bytes(),
                &(suppkey as i32).to_le_bytes(),
                &(availqty as i32).to_le_bytes(),
                &(supplycost as f64).to_le_bytes(),
            ])
            .unwrap();
    }

    let customer = Rc::new(RowTable::new(
        Rc::clone(&arena),
        vec![ColumnType::Int32, ColumnType::CharN(16), ColumnType::Int32],
        DEFAULT_PAGE_SIZE,
        DEFAULT_DIRECTORY_CAPACITY,
    ));
    let customer_id = catalog.create_table(db_id, "customer", Rc::clone(&customer)).unwrap();
    catalog.add_column(customer_id, "c_custkey", ColumnType::Int32).unwrap();
    catalog.add_column(customer_id, "c_name", ColumnType::CharN(16)).unwrap();
    catalog.add_column(customer_id, "c_nationkey", ColumnType::Int32).unwrap();
    for (key, name, nation) in [(1, "Cust1", 18), (2, "Cust2", 5), (3, "Cust3", 18)] {
        customer
            .insert_columns(&[&(key as i32).to_le_bytes(), &charn(name, 16), &(nation as i32).to_le_bytes()])
            .unwrap();
    }

    let orders = Rc::new(RowTable::new(
        Rc::clone(&arena),
        vec![ColumnType::Int32, ColumnType::Int32, ColumnType::Float64],
        DEFAULT_PAGE_SIZE,
        DEFAULT_DIRECTORY_CAPACITY,
    ));
    let orders_id = catalog.create_table(db_id, "orders", Rc::clone(&orders)).unwrap();
    catalog.add_column(orders_id, "o_orderkey", ColumnType::Int32).unwrap();
    catalog.add_column(orders_id, "o_custkey", ColumnType::Int32).unwrap();
    catalog.add_column(orders_id, "o_totalprice", ColumnType::Float64).unwrap();
    for (orderkey, custkey, totalprice) in [(1001, 1, 25000.0), (1002, 2, 15000.0), (1003, 3, 30000.0), (1004, 1, 10000.0)] {
        orders
            .insert_columns(&[&(orderkey as i32).to_le_bytes(), &(custkey as i32).to_le_bytes(), &(totalprice as f64).to_le_bytes()])
            .unwrap();
    }

    Fixture { catalog, db_id }
}

fn eq(column: &str, literal: &str) -> Condition {
    Condition {
        column: column.to_string(),
        op: CompareOp::Eq,
        rhs: Rhs::Literal(literal.to_string()),
    }
}

fn cmp(column: &str, op: CompareOp, literal: &str) -> Condition {
    Condition {
        column: column.to_string(),
        op,
        rhs: Rhs::Literal(literal.to_string()),
    }
}

fn link(column: &str, other: &str) -> Condition {
    Condition {
        column: column.to_string(),
        op: CompareOp::Link,
        rhs: Rhs::Column(other.to_string()),
    }
}

/// Drains every page from a fresh query, returning the concatenated rows
/// and the per-call row counts (used by the pagination test).
fn drain_all(executor: &mut Executor, catalog: &Catalog, db_id: usize, query: &SelectQuery) -> (ResultTable, Vec<usize>) {
    let mut all: Option<ResultTable> = None;
    let mut counts = Vec::new();
    let mut page = ResultTable::one_row(vec![]);
    let mut query_opt = Some(query);
    loop {
        let produced = executor.exec(catalog, db_id, query_opt.take(), &mut page).unwrap();
        if all.is_none() {
            all = Some(ResultTable::growable(page.types().to_vec()));
        }
        let all = all.as_mut().unwrap();
        counts.push(page.row_count());
        for r in 0..page.row_count() {
            let idx = all.push_row_grow();
            all.copy_row_from(idx, &page, r);
        }
        if !produced {
            break;
        }
    }
    (all.unwrap(), counts)
}

#[test]
fn tq1_single_column_filter() {
    let fx = build_fixture();
    let query = SelectQuery {
        database: "tpch".to_string(),
        select_columns: vec![SelectColumn::plain("s_name")],
        from_tables: vec!["supplier".to_string()],
        where_conditions: vec![eq("s_nationkey", "18")],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    let names: Vec<String> = (0..rows.row_count()).map(|r| read_text(&rows, r, 0)).collect();
    assert_eq!(names, vec!["Supplier1", "Supplier3", "Supplier5"]);
}

#[test]
fn tq2_two_predicate_filter() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("ps_partkey"), SelectColumn::plain("ps_availqty")],
        from_tables: vec!["partsupp".to_string()],
        where_conditions: vec![eq("ps_suppkey", "6"), cmp("ps_availqty", CompareOp::Lt, "8000")],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    let got: Vec<(i32, i32)> = (0..rows.row_count())
        .map(|r| {
            (
                i32::from_le_bytes(rows.get(r, 0).try_into().unwrap()),
                i32::from_le_bytes(rows.get(r, 1).try_into().unwrap()),
            )
        })
        .collect();
    assert_eq!(got, vec![(100, 5000), (100, 3000), (300, 1000)]);
}

#[test]
fn tq6_two_table_join() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("c_name"), SelectColumn::plain("o_totalprice")],
        from_tables: vec!["customer".to_string(), "orders".to_string()],
        where_conditions: vec![link("c_custkey", "o_custkey")],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    assert_eq!(rows.row_count(), 4);
}

#[test]
fn tq11_join_and_filter() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("c_name"), SelectColumn::plain("o_totalprice")],
        from_tables: vec!["customer".to_string(), "orders".to_string()],
        where_conditions: vec![
            link("c_custkey", "o_custkey"),
            eq("c_nationkey", "18"),
            cmp("o_totalprice", CompareOp::Gt, "20000"),
        ],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    let mut got: Vec<(String, i64)> = (0..rows.row_count())
        .map(|r| (read_text(&rows, r, 0), f64::from_le_bytes(rows.get(r, 1).try_into().unwrap()) as i64))
        .collect();
    got.sort();
    assert_eq!(got, vec![("Cust1".to_string(), 25000), ("Cust3".to_string(), 30000)]);
}

#[test]
fn tq16_group_by_with_aggregate() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("ps_partkey"), SelectColumn::aggregated("ps_availqty", AggregateMethod::Sum)],
        from_tables: vec!["partsupp".to_string()],
        where_conditions: vec![eq("ps_suppkey", "6"), cmp("ps_supplycost", CompareOp::Lt, "2000")],
        groupby_columns: vec!["ps_partkey".to_string()],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    let mut got: Vec<(i32, i32)> = (0..rows.row_count())
        .map(|r| {
            (
                i32::from_le_bytes(rows.get(r, 0).try_into().unwrap()),
                i32::from_le_bytes(rows.get(r, 1).try_into().unwrap()),
            )
        })
        .collect();
    got.sort_unstable();
    assert_eq!(got, vec![(100, 8000), (200, 9000)]);
}

#[test]
fn tq21_filter_and_order_by() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("ps_partkey"), SelectColumn::plain("ps_availqty")],
        from_tables: vec!["partsupp".to_string()],
        where_conditions: vec![eq("ps_suppkey", "6"), cmp("ps_availqty", CompareOp::Lt, "8000")],
        orderby_columns: vec!["ps_availqty".to_string()],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, _) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    let got: Vec<i32> = (0..rows.row_count()).map(|r| i32::from_le_bytes(rows.get(r, 1).try_into().unwrap())).collect();
    assert_eq!(got, vec![1000, 3000, 5000]);
}

#[test]
fn pagination_concatenates_to_the_single_call_result() {
    let fx = build_fixture();
    let query = SelectQuery {
        select_columns: vec![SelectColumn::plain("s_name")],
        from_tables: vec!["supplier".to_string()],
        where_conditions: vec![],
        ..SelectQuery::new("tpch")
    };
    let arena = Rc::new(Arena::new(1 << 20, 8));
    let mut executor = Executor::new(arena);
    let (rows, counts) = drain_all(&mut executor, &fx.catalog, fx.db_id, &query);
    assert_eq!(rows.row_count(), 5);
    let row_length = ColumnType::CharN(16).byte_width();
    let page_cap = (1024 / row_length).max(1);
    for &c in &counts[..counts.len() - 1] {
        assert!(c <= page_cap);
    }
}
