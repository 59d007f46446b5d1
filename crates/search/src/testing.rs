//! Shared fixtures for unit tests.

use std::sync::Arc;

use catalog::{
    Catalog, CreditRole, EntityCache, MovieDetail, MovieId, MovieSummary, PersonId, PersonRef,
};

pub(crate) fn person(id: PersonId, name: &str, popularity: f32) -> PersonRef {
    PersonRef {
        id,
        name: name.to_string(),
        popularity,
        job: None,
    }
}

pub(crate) fn summary(id: MovieId, date: Option<&str>, popularity: f32) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {}", id),
        release_date: date.map(str::to_string),
        popularity,
        poster_path: None,
    }
}

pub(crate) fn dated_movie(id: MovieId, title: &str, date: &str) -> MovieDetail {
    MovieDetail {
        id,
        title: title.to_string(),
        release_date: Some(date.to_string()),
        poster_path: None,
        genres: vec![],
        popularity: 1.0,
    }
}

/// Credit `person_id` as cast on every movie in `movies`
pub(crate) fn link(catalog: &mut Catalog, person_id: PersonId, name: &str, movies: &[MovieId]) {
    for &movie_id in movies {
        catalog.add_credit(movie_id, person(person_id, name, 1.0), CreditRole::Cast);
    }
}

/// Catalog with details for every id in `ids`
pub(crate) fn catalog_with_movies(ids: &[MovieId]) -> Catalog {
    let mut catalog = Catalog::new();
    for &id in ids {
        catalog.insert_movie(dated_movie(id, &format!("Movie {}", id), "2000-01-01"));
    }
    catalog
}

pub(crate) fn cache_for(catalog: Catalog) -> Arc<EntityCache> {
    Arc::new(EntityCache::new(Arc::new(catalog)))
}
