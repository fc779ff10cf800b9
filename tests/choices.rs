use std::collections::HashMap;

use aigman::{Aig, AigEdge, AigParams, NodeId, dfs::Dfs, sim::exhaustive_patterns};
use rand::{Rng, SeedableRng, rngs::StdRng};

const NUM_CIS: usize = 5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pick(rng: &mut StdRng, signals: &[AigEdge]) -> AigEdge {
    let signal = signals[rng.gen_range(0..signals.len())];
    signal.not_if(rng.gen_bool(0.5))
}

/// Random network where later gates read earlier signals, with a few outputs near the end.
fn random_network(rng: &mut StdRng, params: AigParams, num_gates: usize) -> Aig {
    let mut aig = Aig::with_params(params);
    let mut signals: Vec<AigEdge> = (0..NUM_CIS).map(|_| aig.create_ci()).collect();
    for _ in 0..num_gates {
        let a = pick(rng, &signals);
        let b = pick(rng, &signals);
        let signal = match rng.gen_range(0..4) {
            0 => aig.xor(a, b),
            1 => aig.or(a, b),
            2 => {
                let c = pick(rng, &signals);
                aig.mux(a, b, c)
            }
            _ => aig.and(a, b),
        };
        signals.push(signal);
    }
    for _ in 0..4 {
        let start = signals.len() / 2;
        let signal = pick(rng, &signals[start..]);
        aig.create_co(signal);
    }
    aig
}

/// Dangling alternative implementations of XOR and of AND chains.
fn add_alternatives(rng: &mut StdRng, aig: &mut Aig, count: usize) {
    let signals: Vec<AigEdge> = aig
        .nodes()
        .filter(|n| !n.is_co())
        .map(|n| AigEdge::new(n.get_id(), false))
        .collect();
    for _ in 0..count {
        let p = pick(rng, &signals);
        let q = pick(rng, &signals);
        let r = pick(rng, &signals);
        let _ = aig.xor(p, q);
        let l = aig.and(p, !q);
        let m = aig.and(!p, q);
        let _ = aig.or(l, m);
        let pq = aig.and(p, q);
        let _ = aig.and(pq, r);
        let qr = aig.and(q, r);
        let _ = aig.and(p, qr);
    }
}

/// Groups nodes computing the same function up to complement, smallest id first.
fn signature_classes(aig: &Aig) -> Vec<Vec<NodeId>> {
    let values = aig
        .simulate_nodes(&exhaustive_patterns(aig.num_cis()))
        .unwrap();
    let mut classes: HashMap<u64, Vec<NodeId>> = HashMap::new();
    for node in aig.nodes().filter(|n| !n.is_co() && !n.is_buf()) {
        let id = node.get_id();
        // Bit 0 is the all-zero pattern, ie the phase
        let key = if node.get_phase() { !values[id] } else { values[id] };
        classes.entry(key).or_default().push(id);
    }
    let mut classes: Vec<Vec<NodeId>> = classes.into_values().filter(|c| c.len() > 1).collect();
    for class in classes.iter_mut() {
        class.sort();
    }
    classes.sort();
    classes
}

fn in_cone(aig: &Aig, root: NodeId, target: NodeId) -> bool {
    let mut dfs = Dfs::from_node(root);
    while let Some(id) = dfs.next(aig) {
        if id == target {
            return true;
        }
    }
    false
}

/// An equivalent pair `(old, new)` which can be replaced without creating a cycle.
fn find_candidate(aig: &Aig) -> Option<(NodeId, AigEdge)> {
    for class in signature_classes(aig) {
        let repr = class[0];
        for &member in &class[1..] {
            if !aig.get_node(member).unwrap().is_node() || in_cone(aig, repr, member) {
                continue;
            }
            let phase = aig.get_node(member).unwrap().get_phase();
            let repr_phase = aig.get_node(repr).unwrap().get_phase();
            return Some((member, AigEdge::new(repr, phase ^ repr_phase)));
        }
    }
    None
}

fn sweep(seed: u64, params: AigParams) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut aig = random_network(&mut rng, params, 40);
    add_alternatives(&mut rng, &mut aig, 4);
    aig.check_integrity().unwrap();
    let patterns = exhaustive_patterns(NUM_CIS);
    let reference = aig.simulate(&patterns).unwrap();
    let cos = aig.get_cos().to_vec();

    let mut rounds = 0;
    while let Some((old, new)) = find_candidate(&aig) {
        let before = aig.num_objs();
        aig.replace(old, new, true).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(aig.num_bufs(), 0);
        assert!(aig.num_objs() < before);
        rounds += 1;
        assert!(rounds < 1000);
    }

    // Output ids did not move, and still compute the same functions
    assert_eq!(aig.get_cos(), cos.as_slice());
    assert_eq!(aig.simulate(&patterns).unwrap(), reference);
    for co in aig.get_cos() {
        let driver = aig.get_co_driver(*co).unwrap();
        assert!(!aig.get_node(driver.get_node_id()).unwrap().is_buf());
    }
}

#[test]
fn sweep_equivalent_nodes() {
    init_logger();
    for seed in 0..20 {
        sweep(seed, AigParams::default());
    }
}

#[test]
fn sweep_without_xor() {
    init_logger();
    for seed in 100..110 {
        sweep(seed, AigParams::default().catch_xor(false).fanouts(false));
    }
}

fn build_choices(seed: u64) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut aig = random_network(&mut rng, AigParams::default(), 30);
    add_alternatives(&mut rng, &mut aig, 6);
    let patterns = exhaustive_patterns(NUM_CIS);
    let reference = aig.simulate(&patterns).unwrap();

    // Propose every simulation class, right or wrong for the structure
    for class in signature_classes(&aig) {
        for &member in &class[1..] {
            if aig.get_node(member).unwrap().is_node() {
                aig.merge(class[0], member);
            }
        }
    }
    let proposed = aig.count_reprs();
    aig.remap_reprs();
    assert_eq!(aig.count_reprs(), proposed);
    for id in aig.gate_ids() {
        if let Some(repr) = aig.find_repr(id) {
            assert_eq!(aig.find_repr(repr), None);
        }
    }

    let kept = aig.mark_valid_choices();
    assert_eq!(kept, aig.count_reprs());
    for id in aig.gate_ids() {
        let Some(repr) = aig.find_repr(id) else {
            continue;
        };
        assert!(repr < id);
        assert!(aig.get_node(repr).unwrap().is_node());
        assert_eq!(aig.get_node(id).unwrap().get_refs(), 0);
        assert!(!in_cone(&aig, id, repr));
        assert!(aig.choice_class(repr).contains(&id));
    }
    aig.check_integrity().unwrap();

    // Substituting every class member by its representative keeps the outputs
    let dup = aig.dup_repr().unwrap();
    dup.check_integrity().unwrap();
    assert_eq!(dup.simulate(&patterns).unwrap(), reference);
    let (ordered, map) = aig.dup_repr_with_map(true).unwrap();
    assert_eq!(ordered.simulate(&patterns).unwrap(), reference);
    for id in aig.gate_ids() {
        assert!(map.contains(id));
    }

    // A plain copy carries the classes over
    let (mut copy, map) = aig.deep_clone_with_map().unwrap();
    assert_eq!(copy.simulate(&patterns).unwrap(), reference);
    aig.transfer_repr(&mut copy, &map);
    copy.check_integrity().unwrap();
    kept
}

#[test]
fn choices_from_simulation() {
    init_logger();
    let kept: usize = (0..20).map(build_choices).sum();
    assert!(kept > 0);
}

#[test]
fn replace_keeps_external_ids() {
    init_logger();
    let mut aig = Aig::new();
    let a = aig.create_ci();
    let b = aig.create_ci();
    let n1 = aig.and(a, b);
    let n2 = aig.and(b, a);
    assert_eq!(n1.get_node_id(), n2.get_node_id());
    assert_eq!(aig.get_node(a.get_node_id()).unwrap().get_refs(), 1);
    assert_eq!(aig.get_node(b.get_node_id()).unwrap().get_refs(), 1);

    let o = aig.create_co(n1);
    let new = aig.and(a, !b);
    aig.replace(n1.get_node_id(), new, false).unwrap();
    assert_eq!(aig.get_co_driver(o).unwrap().get_node_id(), n1.get_node_id());
    let outs = aig.simulate(&exhaustive_patterns(2)).unwrap();
    let va = exhaustive_patterns(2)[0];
    let vb = exhaustive_patterns(2)[1];
    assert_eq!(outs[0], va & !vb);
    aig.check_integrity().unwrap();
}
