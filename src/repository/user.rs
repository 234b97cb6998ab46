use diesel::prelude::*;

use crate::domain::user::{NewUser, User, UserChanges};
use crate::models::user::{NewUser as DbNewUser, User as DbUser, UserChangeset};
use crate::repository::{DieselRepository, RepositoryError, RepositoryResult, UserReader, UserWriter};

fn into_domain(row: DbUser) -> RepositoryResult<User> {
    User::try_from(row).map_err(RepositoryError::Unexpected)
}

impl UserReader for DieselRepository {
    fn list_users(&self) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let rows = users::table
            .order(users::id.asc())
            .select(DbUser::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(into_domain).collect()
    }

    fn get_user(&self, user_id: i32) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        users::table
            .filter(users::id.eq(user_id))
            .select(DbUser::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        users::table
            .filter(users::email.eq(email))
            .select(DbUser::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = DbNewUser::try_from(user)?;

        let row = diesel::insert_into(users::table)
            .values(&db_user)
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }

    fn update_user(&self, user_id: i32, changes: &UserChanges) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let changeset = UserChangeset::try_from(changes)?;

        let row = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(&changeset)
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }

    fn delete_user(&self, user_id: i32) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let row = diesel::delete(users::table.filter(users::id.eq(user_id)))
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        into_domain(row)
    }
}
