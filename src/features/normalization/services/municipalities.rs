//! Approximate town-hall positions of the municipalities that host an
//! inspection station, used when a record carries no usable coordinates.

use crate::features::normalization::models::Coordinates;
use crate::features::regions::models::Region;
use crate::shared::text::fold;

type Centroid = (&'static str, f64, f64);

static CAT_CENTROIDS: &[Centroid] = &[
    ("barcelona", 41.3874, 2.1686),
    ("l'hospitalet de llobregat", 41.3596, 2.0997),
    ("badalona", 41.4500, 2.2474),
    ("sabadell", 41.5463, 2.1086),
    ("terrassa", 41.5610, 2.0089),
    ("mataro", 41.5381, 2.4445),
    ("granollers", 41.6079, 2.2876),
    ("manresa", 41.7251, 1.8266),
    ("vic", 41.9301, 2.2549),
    ("vilafranca del penedes", 41.3465, 1.6988),
    ("girona", 41.9794, 2.8214),
    ("figueres", 42.2654, 2.9581),
    ("olot", 42.1817, 2.4893),
    ("lleida", 41.6176, 0.6200),
    ("tarragona", 41.1189, 1.2445),
    ("reus", 41.1561, 1.1069),
    ("tortosa", 40.8125, 0.5216),
];

static GAL_CENTROIDS: &[Centroid] = &[
    ("a coruna", 43.3623, -8.4115),
    ("santiago de compostela", 42.8782, -8.5448),
    ("ferrol", 43.4832, -8.2369),
    ("carballo", 43.2130, -8.6910),
    ("ribeira", 42.5540, -8.9911),
    ("lugo", 43.0097, -7.5568),
    ("monforte de lemos", 42.5219, -7.5146),
    ("viveiro", 43.6617, -7.5947),
    ("ourense", 42.3358, -7.8639),
    ("verin", 41.9410, -7.4364),
    ("xinzo de limia", 42.0635, -7.7246),
    ("pontevedra", 42.4310, -8.6444),
    ("vigo", 42.2406, -8.7207),
    ("o porrino", 42.1615, -8.6197),
    ("lalin", 42.6612, -8.1118),
];

static CV_CENTROIDS: &[Centroid] = &[
    ("valencia", 39.4699, -0.3763),
    ("torrent", 39.4371, -0.4655),
    ("paterna", 39.5030, -0.4406),
    ("sagunto", 39.6799, -0.2784),
    ("gandia", 38.9677, -0.1814),
    ("xativa", 38.9905, -0.5185),
    ("alzira", 39.1516, -0.4355),
    ("requena", 39.4883, -1.1004),
    ("alicante", 38.3452, -0.4810),
    ("elche", 38.2669, -0.6983),
    ("elx", 38.2669, -0.6983),
    ("benidorm", 38.5411, -0.1225),
    ("orihuela", 38.0848, -0.9440),
    ("alcoy", 38.6983, -0.4736),
    ("alcoi", 38.6983, -0.4736),
    ("elda", 38.4778, -0.7916),
    ("denia", 38.8408, 0.1057),
    ("castellon de la plana", 39.9864, -0.0513),
    ("castello de la plana", 39.9864, -0.0513),
    ("castellon", 39.9864, -0.0513),
    ("vila-real", 39.9381, -0.1004),
    ("vinaros", 40.4705, 0.4752),
];

/// Centroid of `locality` in `region`, matched on the folded name
pub fn municipality_centroid(region: Region, locality: &str) -> Option<Coordinates> {
    let table = match region {
        Region::Cat => CAT_CENTROIDS,
        Region::Gal => GAL_CENTROIDS,
        Region::Cv => CV_CENTROIDS,
    };
    let key = fold(locality);
    table
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|&(_, latitude, longitude)| Coordinates {
            latitude,
            longitude,
        })
}
