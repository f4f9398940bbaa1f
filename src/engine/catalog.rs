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

//! The registry of named objects the loader populates and the
//! executor queries against. Database/Table/Column/Index are tagged
//! variants of one `Object` enum, owned by a single `Vec` and referred
//! to everywhere else by id; there is no owning-pointer graph, and
//! nothing here needs a virtual table.

use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::data::ColumnType;
use crate::engine::idx::HashIndex;
use crate::engine::row::RowTable;
use crate::util::error::{DbError, DbResult};

pub type ObjectId = usize;

pub struct DatabaseObj {
    pub name: String,
    pub tables: Vec<ObjectId>,
}

pub struct TableObj {
    pub name: String,
    pub database: ObjectId,
    pub row_table: Rc<RowTable>,
    pub columns: Vec<ObjectId>,
    pub indexes: Vec<ObjectId>,
}

pub struct ColumnObj {
    pub name: String,
    pub table: ObjectId,
    /// Position of this column in its table's row pattern.
    pub index_in_row: usize,
    pub ty: ColumnType,
}

pub struct IndexObj {
    pub name: String,
    pub table: ObjectId,
    pub hash_index: Rc<HashIndex>,
    pub key_columns: Vec<ObjectId>,
}

enum Object {
    Database(DatabaseObj),
    Table(TableObj),
    Column(ColumnObj),
    Index(IndexObj),
}

#[derive(Default)]
pub struct Catalog {
    objects: Vec<Object>,
    db_names: HashMap<String, ObjectId>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn create_database(&mut self, name: &str) -> DbResult<ObjectId> {
        if self.db_names.contains_key(name) {
            return Err(DbError::DuplicateName { name: name.to_string() });
        }
        let id = self.objects.len();
        self.objects.push(Object::Database(DatabaseObj {
            name: name.to_string(),
            tables: Vec::new(),
        }));
        self.db_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn database_id(&self, name: &str) -> DbResult<ObjectId> {
        self.db_names
            .get(name)
            .copied()
            .ok_or_else(|| DbError::UnknownObject { name: name.to_string() })
    }

    pub fn database(&self, id: ObjectId) -> &DatabaseObj {
        match &self.objects[id] {
            Object::Database(d) => d,
            _ => panic!("catalog id {id} is not a database"),
        }
    }

    pub fn create_table(&mut self, db_id: ObjectId, name: &str, row_table: Rc<RowTable>) -> DbResult<ObjectId> {
        if self.table_id(db_id, name).is_ok() {
            return Err(DbError::DuplicateName { name: name.to_string() });
        }
        let id = self.objects.len();
        self.objects.push(Object::Table(TableObj {
            name: name.to_string(),
            database: db_id,
            row_table,
            columns: Vec::new(),
            indexes: Vec::new(),
        }));
        if let Object::Database(d) = &mut self.objects[db_id] {
            d.tables.push(id);
        }
        Ok(id)
    }

    pub fn table(&self, id: ObjectId) -> &TableObj {
        match &self.objects[id] {
            Object::Table(t) => t,
            _ => panic!("catalog id {id} is not a table"),
        }
    }

    pub fn table_id(&self, db_id: ObjectId, name: &str) -> DbResult<ObjectId> {
        for &t in &self.database(db_id).tables {
            if self.table(t).name == name {
                return Ok(t);
            }
        }
        Err(DbError::UnknownObject { name: name.to_string() })
    }

    pub fn add_column(&mut self, table_id: ObjectId, name: &str, ty: ColumnType) -> DbResult<ObjectId> {
        if self.column_id(table_id, name).is_ok() {
            return Err(DbError::DuplicateName { name: name.to_string() });
        }
        let index_in_row = self.table(table_id).columns.len();
        let id = self.objects.len();
        self.objects.push(Object::Column(ColumnObj {
            name: name.to_string(),
            table: table_id,
            index_in_row,
            ty,
        }));
        if let Object::Table(t) = &mut self.objects[table_id] {
            t.columns.push(id);
        }
        Ok(id)
    }

    pub fn column(&self, id: ObjectId) -> &ColumnObj {
        match &self.objects[id] {
            Object::Column(c) => c,
            _ => panic!("catalog id {id} is not a column"),
        }
    }

    pub fn column_id(&self, table_id: ObjectId, name: &str) -> DbResult<ObjectId> {
        for &c in &self.table(table_id).columns {
            if self.column(c).name == name {
                return Ok(c);
            }
        }
        Err(DbError::UnknownColumn {
            table: self.table(table_id).name.clone(),
            column: name.to_string(),
        })
    }

    pub fn create_index(
        &mut self,
        table_id: ObjectId,
        name: &str,
        hash_index: Rc<HashIndex>,
        key_columns: Vec<ObjectId>,
    ) -> DbResult<ObjectId> {
        let id = self.objects.len();
        self.objects.push(Object::Index(IndexObj {
            name: name.to_string(),
            table: table_id,
            hash_index,
            key_columns,
        }));
        if let Object::Table(t) = &mut self.objects[table_id] {
            t.indexes.push(id);
        }
        Ok(id)
    }

    pub fn index(&self, id: ObjectId) -> &IndexObj {
        match &self.objects[id] {
            Object::Index(i) => i,
            _ => panic!("catalog id {id} is not an index"),
        }
    }

    /// Finds an index on `table_id` whose key columns (in row order)
    /// exactly match `cols`, if one was declared in the schema.
    pub fn find_index_for_columns(&self, table_id: ObjectId, cols: &[usize]) -> Option<&IndexObj> {
        self.table(table_id)
            .indexes
            .iter()
            .map(|&i| self.index(i))
            .find(|ix| {
                let ix_cols: Vec<usize> = ix.key_columns.iter().map(|&c| self.column(c).index_in_row).collect();
                ix_cols == cols
            })
    }
}
