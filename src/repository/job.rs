use diesel::prelude::*;

use crate::domain::job::{Job, JobChanges, NewJob};
use crate::models::job::{Job as DbJob, JobChangeset, NewJob as DbNewJob};
use crate::repository::{DieselRepository, JobReader, JobWriter, RepositoryError, RepositoryResult};

fn into_domain(row: DbJob) -> RepositoryResult<Job> {
    Job::try_from(row).map_err(RepositoryError::Unexpected)
}

impl JobReader for DieselRepository {
    fn list_jobs(&self) -> RepositoryResult<Vec<Job>> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;

        let rows = jobs::table
            .order(jobs::id.asc())
            .select(DbJob::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(into_domain).collect()
    }

    fn get_job(&self, job_id: i32) -> RepositoryResult<Option<Job>> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;

        jobs::table
            .filter(jobs::id.eq(job_id))
            .select(DbJob::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn find_job_by_title(&self, title: &str) -> RepositoryResult<Option<Job>> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;

        // Titles are unique, so at most one row matches
        jobs::table
            .filter(jobs::title.eq(title))
            .select(DbJob::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }
}

impl JobWriter for DieselRepository {
    fn create_job(&self, job: &NewJob) -> RepositoryResult<Job> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let db_job = DbNewJob::try_from(job)?;

        let row = diesel::insert_into(jobs::table)
            .values(&db_job)
            .returning(DbJob::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }

    fn update_job(&self, job_id: i32, changes: &JobChanges) -> RepositoryResult<Job> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let changeset = JobChangeset::try_from(changes)?;

        let row = diesel::update(jobs::table.filter(jobs::id.eq(job_id)))
            .set(&changeset)
            .returning(DbJob::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }

    fn delete_job(&self, job_id: i32) -> RepositoryResult<Job> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;

        let row = diesel::delete(jobs::table.filter(jobs::id.eq(job_id)))
            .returning(DbJob::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }
}
