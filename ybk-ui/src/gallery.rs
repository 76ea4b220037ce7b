//! Class photo gallery shown in the home page carousel

use serde::Serialize;

/// One carousel slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPhoto {
    pub id: &'static str,
    pub image: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub date: &'static str,
    pub category: &'static str,
}

const CLASS_PHOTOS: &[ClassPhoto] = &[
    ClassPhoto {
        id: "orientation",
        image: "/images/orientation.JPG",
        title: "Orientasi Mahasiswa Baru",
        description: "Hari pertama kami bertemu dan memulai perjalanan bersama",
        date: "Agustus 2025",
        category: "event",
    },
    ClassPhoto {
        id: "study-group",
        image: "/images/study-group.JPG",
        title: "Belajar Bersama",
        description: "Saling membantu dalam menghadapi tantangan akademik",
        date: "Agustus 2025",
        category: "academic",
    },
    ClassPhoto {
        id: "project-demo",
        image: "/images/project-demo.JPG",
        title: "Demo Proyek",
        description: "Menampilkan hasil karya dan inovasi terbaru",
        date: "Agustus 2025",
        category: "project",
    },
];

/// Photos in `category`, or all of them when no category is given
pub fn photos_by_category(category: Option<&str>) -> Vec<&'static ClassPhoto> {
    match category.filter(|c| !c.is_empty()) {
        None => CLASS_PHOTOS.iter().collect(),
        Some(category) => CLASS_PHOTOS
            .iter()
            .filter(|photo| photo.category == category)
            .collect(),
    }
}

pub fn photo_by_id(id: &str) -> Option<&'static ClassPhoto> {
    CLASS_PHOTOS.iter().find(|photo| photo.id == id)
}
