use chrono::Utc;
use rusqlite::{params, Connection, Result, Row};
use std::path::Path;

use crate::models::{
    Completion, Course, CourseOutline, CourseSummary, Importance, Module, ModuleWithTopics,
    Topic,
};
use crate::syllabus::ParsedSyllabus;

pub struct Database {
    conn: Connection,
}

/// Fields to change on a module; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct ModuleUpdate<'a> {
    pub number: Option<i32>,
    pub name: Option<&'a str>,
    pub hours: Option<i32>,
}

/// Fields to change on a topic; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate<'a> {
    pub name: Option<&'a str>,
    pub completion: Option<Completion>,
    pub importance: Option<Importance>,
}

fn course_from_row(row: &Row) -> Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn module_from_row(row: &Row) -> Result<Module> {
    Ok(Module {
        id: row.get(0)?,
        course_id: row.get(1)?,
        number: row.get(2)?,
        name: row.get(3)?,
        hours: row.get(4)?,
    })
}

fn topic_from_row(row: &Row) -> Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        module_id: row.get(1)?,
        name: row.get(2)?,
        completion_status: row.get(3)?,
        importance: row.get(4)?,
    })
}

fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Cascading deletes depend on this; SQLite leaves it off per connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS modules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                number INTEGER NOT NULL,
                name TEXT NOT NULL,
                hours INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS topics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                module_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                completion_status INTEGER NOT NULL DEFAULT 0
                    CHECK(completion_status BETWEEN 0 AND 100),
                importance INTEGER NOT NULL DEFAULT 0
                    CHECK(importance BETWEEN 0 AND 5),
                FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_modules_course ON modules(course_id, number);
            CREATE INDEX IF NOT EXISTS idx_topics_module ON topics(module_id);
            "#,
        )?;
        Ok(())
    }

    // Ingestion

    /// Stores a parsed syllabus in one transaction and returns the course id.
    ///
    /// Any failure rolls back every row written for this syllabus.
    pub fn insert_syllabus(&mut self, syllabus: &ParsedSyllabus) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO courses (name, code, created_at) VALUES (?1, ?2, ?3)",
            params![
                syllabus.header.name,
                syllabus.header.code,
                Utc::now().to_rfc3339()
            ],
        )?;
        let course_id = tx.last_insert_rowid();

        for module in &syllabus.modules {
            tx.execute(
                "INSERT INTO modules (course_id, number, name, hours) VALUES (?1, ?2, ?3, ?4)",
                params![course_id, module.number, module.name, module.hours],
            )?;
            let module_id = tx.last_insert_rowid();

            for topic in &module.topics {
                tx.execute(
                    "INSERT INTO topics (module_id, name, completion_status, importance) VALUES (?1, ?2, 0, 0)",
                    params![module_id, topic],
                )?;
            }
        }

        tx.commit()?;
        Ok(course_id)
    }

    // Course operations
    pub fn add_course(&self, code: &str, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO courses (name, code, created_at) VALUES (?1, ?2, ?3)",
            params![name, code, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_course(&self, id: i64) -> Result<Option<Course>> {
        optional(self.conn.query_row(
            "SELECT id, name, code, created_at FROM courses WHERE id = ?1",
            params![id],
            course_from_row,
        ))
    }

    /// Courses with their module/topic counts and average completion,
    /// newest first.
    pub fn list_course_summaries(&self) -> Result<Vec<CourseSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.id, c.name, c.code, c.created_at,
                   COUNT(DISTINCT m.id) AS module_count,
                   COUNT(t.id) AS topic_count,
                   COALESCE(AVG(t.completion_status), 0) AS avg_completion
            FROM courses c
            LEFT JOIN modules m ON m.course_id = c.id
            LEFT JOIN topics t ON t.module_id = m.id
            GROUP BY c.id, c.name, c.code, c.created_at
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CourseSummary {
                course: course_from_row(row)?,
                module_count: row.get(4)?,
                topic_count: row.get(5)?,
                avg_completion: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    pub fn update_course(&self, id: i64, code: Option<&str>, name: Option<&str>) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE courses SET code = COALESCE(?1, code), name = COALESCE(?2, name) WHERE id = ?3",
            params![code, name, id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_course(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Module operations
    pub fn add_module(&self, course_id: i64, number: i32, name: &str, hours: i32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO modules (course_id, number, name, hours) VALUES (?1, ?2, ?3, ?4)",
            params![course_id, number, name, hours],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_module(&self, id: i64) -> Result<Option<Module>> {
        optional(self.conn.query_row(
            "SELECT id, course_id, number, name, hours FROM modules WHERE id = ?1",
            params![id],
            module_from_row,
        ))
    }

    pub fn list_modules(&self, course_id: i64) -> Result<Vec<Module>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, course_id, number, name, hours FROM modules WHERE course_id = ?1 ORDER BY number, id",
        )?;
        let rows = stmt.query_map(params![course_id], module_from_row)?;
        rows.collect()
    }

    pub fn update_module(&self, id: i64, update: &ModuleUpdate) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            UPDATE modules
            SET number = COALESCE(?1, number),
                name = COALESCE(?2, name),
                hours = COALESCE(?3, hours)
            WHERE id = ?4
            "#,
            params![update.number, update.name, update.hours, id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_module(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM modules WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Topic operations
    pub fn add_topic(&self, module_id: i64, name: &str, importance: Importance) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO topics (module_id, name, importance) VALUES (?1, ?2, ?3)",
            params![module_id, name, importance.as_i32()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        optional(self.conn.query_row(
            "SELECT id, module_id, name, completion_status, importance FROM topics WHERE id = ?1",
            params![id],
            topic_from_row,
        ))
    }

    pub fn list_topics(&self, module_id: i64) -> Result<Vec<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, module_id, name, completion_status, importance FROM topics WHERE module_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![module_id], topic_from_row)?;
        rows.collect()
    }

    pub fn update_topic(&self, id: i64, update: &TopicUpdate) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            UPDATE topics
            SET name = COALESCE(?1, name),
                completion_status = COALESCE(?2, completion_status),
                importance = COALESCE(?3, importance)
            WHERE id = ?4
            "#,
            params![
                update.name,
                update.completion.map(|c| c.as_i32()),
                update.importance.map(|i| i.as_i32()),
                id
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_topic(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Full hierarchy of one course, modules ordered by number.
    pub fn get_course_outline(&self, course_id: i64) -> Result<Option<CourseOutline>> {
        let Some(course) = self.get_course(course_id)? else {
            return Ok(None);
        };

        let mut modules = Vec::new();
        for module in self.list_modules(course_id)? {
            let topics = self.list_topics(module.id)?;
            modules.push(ModuleWithTopics { module, topics });
        }

        Ok(Some(CourseOutline { course, modules }))
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let total_courses: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;

        let total_modules: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM modules", [], |row| row.get(0))?;

        let total_topics: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM topics", [], |row| row.get(0))?;

        let completed_topics: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM topics WHERE completion_status >= 100",
            [],
            |row| row.get(0),
        )?;

        let avg_completion: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(completion_status), 0) FROM topics",
            [],
            |row| row.get(0),
        )?;

        Ok(Stats {
            total_courses,
            total_modules,
            total_topics,
            completed_topics,
            avg_completion,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub total_courses: i64,
    pub total_modules: i64,
    pub total_topics: i64,
    pub completed_topics: i64,
    pub avg_completion: f64,
}
