use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    entities::student::{Student, StudentInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxStudentRepo,
};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn find_all(&self) -> Result<Vec<Student>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn insert(&self, student: &StudentInsert) -> Result<Student, AppError>;
    async fn save(&self, student: &Student) -> Result<Student, AppError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
impl<T> StudentRepository for Arc<T>
where
    T: StudentRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, student: &StudentInsert) -> Result<Student, AppError> {
        (**self).insert(student).await
    }

    async fn save(&self, student: &Student) -> Result<Student, AppError> {
        (**self).save(student).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        (**self).delete_by_id(id).await
    }
}

impl SqlxStudentRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxStudentRepo { pool }
    }
}

#[async_trait]
impl StudentRepository for SqlxStudentRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students ORDER BY id"#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students WHERE id = $1"#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn insert(&self, student: &StudentInsert) -> Result<Student, AppError> {
        let created = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                student_name,
                last_name,
                birth_date,
                registration_date,
                registration_end_date,
                image_path
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        )
        .bind(&student.student_name)
        .bind(&student.last_name)
        .bind(student.birth_date)
        .bind(student.registration_date)
        .bind(student.registration_end_date)
        .bind(&student.image_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn save(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET student_name = $2,
                last_name = $3,
                birth_date = $4,
                registration_date = $5,
                registration_end_date = $6,
                image_path = $7
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(student.id)
        .bind(&student.student_name)
        .bind(&student.last_name)
        .bind(student.birth_date)
        .bind(student.registration_date)
        .bind(student.registration_end_date)
        .bind(&student.image_path)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", student.id)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM students WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| {
                if result.rows_affected() == 0 {
                    Err(AppError::NotFound(format!("Student {} not found", id)))
                } else {
                    Ok(())
                }
            })?
    }
}
